//! The state owner: a single task that holds canonical state.
//!
//! Callers talk to it through [`OwnerClient`], which only ever enqueues
//! commands. The owner drains its queue one command at a time, so reducer
//! calls never overlap and messages apply in submission order. After each
//! message, applied or failed, the state is pushed to every subscriber, in
//! order.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::{mpsc, oneshot};

use crate::error::StoreError;

use super::reducer::{reduce_guarded, Reducer};
use super::supervisor::supervise;
use super::task::{self, DispatchOptions, StoreTask, TaskScope};

/// Per-subscriber publication buffer. A full buffer blocks the owner until
/// the subscriber catches up; nothing is dropped.
pub const PUBLISH_BUFFER: usize = 64;

pub(crate) enum OwnerCommand<M, S> {
    Send { message: M, scope: TaskScope },
    Subscribe { sink: mpsc::Sender<S> },
    Snapshot { respond_to: oneshot::Sender<S> },
}

pub(crate) struct StateOwner<M, S, E, R> {
    receiver: mpsc::UnboundedReceiver<OwnerCommand<M, S>>,
    outbox: mpsc::WeakUnboundedSender<OwnerCommand<M, S>>,
    state: S,
    env: Arc<E>,
    reducer: R,
    subscribers: Vec<mpsc::Sender<S>>,
}

impl<M, S, E, R> StateOwner<M, S, E, R>
where
    M: Send + 'static,
    S: Clone + Send + 'static,
    E: Send + Sync + 'static,
    R: Reducer<M, S, E>,
{
    /// Start the owner on the current tokio runtime.
    ///
    /// The owner runs until every [`OwnerClient`] is dropped. Effects hold
    /// only a weak handle to the queue, so in-flight work never keeps the
    /// owner alive.
    pub fn spawn(initial: S, reducer: R, env: Arc<E>) -> OwnerClient<M, S> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let owner = Self {
            receiver,
            outbox: sender.downgrade(),
            state: initial,
            env,
            reducer,
            subscribers: Vec::new(),
        };
        tokio::spawn(owner.run());
        OwnerClient::new(sender)
    }

    async fn run(mut self) {
        tracing::debug!("State owner started");
        while let Some(command) = self.receiver.recv().await {
            match command {
                OwnerCommand::Send { message, scope } => self.apply(message, scope).await,
                OwnerCommand::Subscribe { sink } => {
                    if sink.send(self.state.clone()).await.is_ok() {
                        self.subscribers.push(sink);
                    } else {
                        tracing::trace!("Owner: Subscribe dropped (receiver gone)");
                    }
                }
                OwnerCommand::Snapshot { respond_to } => {
                    if respond_to.send(self.state.clone()).is_err() {
                        tracing::trace!("Owner: Snapshot response dropped (receiver gone)");
                    }
                }
            }
        }
        tracing::debug!("State owner stopped");
    }

    async fn apply(&mut self, message: M, scope: TaskScope) {
        // A dispatched action always applies; cancelling it only stops its
        // effects. Feedback queued by a cancelled tracked effect never lands.
        if scope.is_feedback() && scope.token().is_cancelled() {
            tracing::debug!(task = %scope.id(), "Skipping feedback of cancelled task");
            scope.complete(Err(StoreError::Canceled));
            return;
        }

        let snapshot = self.state.clone();
        match reduce_guarded(&self.reducer, message, &mut self.state, &*self.env) {
            Ok(effect) => {
                tracing::trace!(task = %scope.id(), effects = effect.len(), "Message applied");
                self.publish().await;
                supervise(effect, scope, self.outbox.clone());
            }
            Err(err) => {
                self.state = snapshot;
                tracing::warn!(task = %scope.id(), error = %format!("{err:#}"), "Reducer failed");
                // Republish the unchanged state so optimistic mirrors roll back.
                self.publish().await;
                scope.complete(Err(StoreError::reducer(&err)));
            }
        }
    }

    async fn publish(&mut self) {
        let sinks = std::mem::take(&mut self.subscribers);
        for sink in sinks {
            if sink.send(self.state.clone()).await.is_ok() {
                self.subscribers.push(sink);
            } else {
                tracing::trace!("Owner: dropping closed state subscriber");
            }
        }
    }
}

/// Sending half of the owner's queue.
pub(crate) struct OwnerClient<M, S> {
    sender: mpsc::UnboundedSender<OwnerCommand<M, S>>,
}

impl<M, S> Clone for OwnerClient<M, S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<M, S> OwnerClient<M, S> {
    pub(crate) fn new(sender: mpsc::UnboundedSender<OwnerCommand<M, S>>) -> Self {
        Self { sender }
    }

    /// Enqueue `message` and return the task covering its effects.
    ///
    /// Never blocks. If the owner is gone the task is already finished with
    /// [`StoreError::Disconnected`].
    pub fn send(&self, message: M, options: DispatchOptions) -> StoreTask {
        let (scope, task) = TaskScope::root(options);
        if self
            .sender
            .send(OwnerCommand::Send { message, scope })
            .is_err()
        {
            tracing::debug!("Owner: Send rejected (owner stopped)");
            return task::finished(Err(StoreError::Disconnected));
        }
        task
    }

    /// Subscribe to canonical state. The first item is the state at the time
    /// the subscription is processed; every later item follows one applied
    /// message.
    pub fn subscribe(&self) -> StateStream<S> {
        let (sink, receiver) = mpsc::channel(PUBLISH_BUFFER);
        if self.sender.send(OwnerCommand::Subscribe { sink }).is_err() {
            tracing::debug!("Owner: Subscribe rejected (owner stopped)");
        }
        StateStream { receiver }
    }

    /// Read canonical state, ordered after every message already enqueued.
    pub async fn snapshot(&self) -> Result<S, StoreError> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(OwnerCommand::Snapshot { respond_to })
            .map_err(|_| StoreError::Disconnected)?;
        receiver.await.map_err(|_| StoreError::Disconnected)
    }
}

/// Ordered, lossless stream of published canonical states.
pub struct StateStream<S> {
    receiver: mpsc::Receiver<S>,
}

impl<S> StateStream<S> {
    /// Next published state, or `None` once the owner has stopped.
    pub async fn recv(&mut self) -> Option<S> {
        self.receiver.recv().await
    }
}

impl<S> Stream for StateStream<S> {
    type Item = S;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S>> {
        self.receiver.poll_recv(cx)
    }
}
