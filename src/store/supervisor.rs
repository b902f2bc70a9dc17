//! Runs the effect units of one applied message.
//!
//! Each applied message gets one supervising task. It spawns the message's
//! effect units into a `JoinSet`, folds their outcomes into the message's
//! [`TaskScope`], and, when feedback tracking is on, waits for every action
//! those units emitted before reporting completion.

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::StoreError;

use super::effect::{Effect, EffectRun, Emitter};
use super::owner::OwnerCommand;
use super::task::{StoreTask, TaskResult, TaskScope};

pub(crate) fn supervise<M, S>(
    effect: Effect<M>,
    scope: TaskScope,
    outbox: mpsc::WeakUnboundedSender<OwnerCommand<M, S>>,
) where
    M: Send + 'static,
    S: Send + 'static,
{
    if scope.token().is_cancelled() {
        tracing::debug!(task = %scope.id(), units = effect.len(), "Effects dropped, task already cancelled");
        scope.complete(Err(StoreError::Canceled));
        return;
    }
    if effect.is_empty() {
        scope.complete(Ok(()));
        return;
    }

    let options = scope.options();
    let (feedback_tx, feedback_rx) = mpsc::unbounded_channel::<StoreTask>();
    let token = scope.token().clone();
    let emitter = Emitter::new(move |message: M| {
        if token.is_cancelled() {
            return false;
        }
        let Some(sender) = outbox.upgrade() else {
            tracing::debug!("Effect emitted after state owner stopped");
            return false;
        };
        let (child, task) = if options.tracks_feedbacks {
            TaskScope::child_of(&token, options)
        } else {
            TaskScope::root(options)
        };
        if sender
            .send(OwnerCommand::Send {
                message,
                scope: child,
            })
            .is_err()
        {
            return false;
        }
        if options.tracks_feedbacks {
            let _ = feedback_tx.send(task);
        }
        true
    });

    tokio::spawn(run_scope(effect.into_runs(), emitter, scope, feedback_rx));
}

async fn run_scope<M: Send + 'static>(
    runs: Vec<EffectRun<M>>,
    emitter: Emitter<M>,
    scope: TaskScope,
    mut feedbacks: mpsc::UnboundedReceiver<StoreTask>,
) {
    let priority = scope.options().priority;
    let mut units = JoinSet::new();
    for run in runs {
        let unit = run(emitter.clone());
        units.spawn(async move {
            if priority.is_deferred() {
                tokio::task::yield_now().await;
            }
            unit.await
        });
    }
    // Only running units may emit from here on; the feedback channel closes
    // once the last of them is gone.
    drop(emitter);

    let mut failure: Option<StoreError> = None;
    loop {
        tokio::select! {
            biased;
            _ = scope.token().cancelled() => {
                units.abort_all();
                tracing::debug!(task = %scope.id(), "Effects cancelled");
                scope.complete(Err(StoreError::Canceled));
                return;
            }
            joined = units.join_next() => match joined {
                None => break,
                Some(Ok(Ok(()))) => {}
                Some(Ok(Err(err))) => {
                    tracing::warn!(task = %scope.id(), error = %format!("{err:#}"), "Effect failed");
                    failure.get_or_insert(StoreError::effect(format!("{err:#}")));
                }
                Some(Err(join_err)) => {
                    tracing::warn!(task = %scope.id(), error = %join_err, "Effect aborted");
                    failure.get_or_insert(StoreError::effect(join_err.to_string()));
                }
            }
        }
    }

    loop {
        tokio::select! {
            biased;
            _ = scope.token().cancelled() => {
                tracing::debug!(task = %scope.id(), "Feedback tracking cancelled");
                scope.complete(Err(StoreError::Canceled));
                return;
            }
            next = feedbacks.recv() => match next {
                None => break,
                Some(child) => {
                    if let Err(err) = child.finish().await {
                        if !err.is_canceled() {
                            failure.get_or_insert(err);
                        }
                    }
                }
            }
        }
    }

    let result: TaskResult = match failure {
        Some(err) => Err(err),
        None => Ok(()),
    };
    scope.complete(result);
}
