//! Per-dispatch task handles.
//!
//! Every dispatched message gets a [`TaskScope`] (owned by whoever is running
//! the work) and a [`StoreTask`] (handed to the caller). The scope reports
//! completion through a `watch` channel; the cancellation token is shared so
//! the caller can stop the work. Tracked feedback actions get child tokens,
//! which is what makes cancellation flow down the whole induced subtree.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::StoreError;

pub type TaskResult = Result<(), StoreError>;

/// Scheduling hint for a dispatch's effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
    Background,
}

impl Priority {
    /// Deferred priorities yield to the scheduler once before their effects start.
    pub fn is_deferred(self) -> bool {
        matches!(self, Priority::Low | Priority::Background)
    }
}

/// Options accepted by `dispatch_with`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOptions {
    pub priority: Priority,
    /// When set, the task also waits for every action its effects emit,
    /// recursively.
    pub tracks_feedbacks: bool,
}

impl DispatchOptions {
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn tracking_feedbacks(mut self) -> Self {
        self.tracks_feedbacks = true;
        self
    }
}

/// Cancelable, awaitable handle for one dispatch's induced work.
///
/// Clones share the same completion and cancellation.
#[derive(Debug, Clone)]
pub struct StoreTask {
    id: Uuid,
    token: CancellationToken,
    done: watch::Receiver<Option<TaskResult>>,
}

impl StoreTask {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Cancel this task and every tracked task below it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.done.borrow().is_some()
    }

    /// Wait for the task to complete.
    ///
    /// A result recorded before cancellation wins; otherwise a cancelled task
    /// resolves to [`StoreError::Canceled`] without waiting on the owner.
    pub async fn finish(&self) -> TaskResult {
        let mut done = self.done.clone();
        tokio::select! {
            biased;
            outcome = async { done.wait_for(Option::is_some).await.map(|value| (*value).clone()) } => {
                match outcome {
                    Ok(Some(result)) => result,
                    Ok(None) => Ok(()),
                    Err(_) => Err(StoreError::Disconnected),
                }
            }
            _ = self.token.cancelled() => Err(StoreError::Canceled),
        }
    }
}

/// Producer side of a [`StoreTask`].
pub(crate) struct TaskScope {
    id: Uuid,
    token: CancellationToken,
    options: DispatchOptions,
    /// Set for actions emitted by a tracked parent's effects.
    feedback: bool,
    done: watch::Sender<Option<TaskResult>>,
}

impl TaskScope {
    pub(crate) fn root(options: DispatchOptions) -> (Self, StoreTask) {
        Self::with_token(CancellationToken::new(), options, false)
    }

    /// A scope cancelled together with `parent`.
    pub(crate) fn child_of(parent: &CancellationToken, options: DispatchOptions) -> (Self, StoreTask) {
        Self::with_token(parent.child_token(), options, true)
    }

    fn with_token(
        token: CancellationToken,
        options: DispatchOptions,
        feedback: bool,
    ) -> (Self, StoreTask) {
        let id = Uuid::new_v4();
        let (done, receiver) = watch::channel(None);
        let task = StoreTask {
            id,
            token: token.clone(),
            done: receiver,
        };
        (
            Self {
                id,
                token,
                options,
                feedback,
                done,
            },
            task,
        )
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub(crate) fn options(&self) -> DispatchOptions {
        self.options
    }

    pub(crate) fn is_feedback(&self) -> bool {
        self.feedback
    }

    pub(crate) fn complete(&self, result: TaskResult) {
        self.done.send_replace(Some(result));
    }
}

/// A task that is already complete, for when there is nothing to run.
pub(crate) fn finished(result: TaskResult) -> StoreTask {
    let (scope, task) = TaskScope::root(DispatchOptions::default());
    scope.complete(result);
    task
}
