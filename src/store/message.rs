//! Internal message union and the reducer lifter that feeds it.

use std::fmt;
use std::sync::Arc;

use super::effect::Effect;
use super::reducer::Reducer;

/// Everything the state owner can be asked to apply.
///
/// `Action` goes through the caller's reducer. `StateReplace` overwrites the
/// canonical state outright and never produces an effect. The view store
/// only ever creates `StateReplace` from a binding write.
pub(crate) enum Message<A, S> {
    Action(A),
    StateReplace(S),
}

impl<A: fmt::Debug, S> fmt::Debug for Message<A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Message::StateReplace(_) => f.write_str("StateReplace(..)"),
        }
    }
}

/// Lifts a `Reducer<A, S, E>` into a `Reducer<Message<A, S>, S, E>`.
///
/// Lets a single serialized pipeline carry both reducer-driven transitions
/// and direct overwrites.
pub(crate) struct MessageLifter<A, S, E> {
    inner: Arc<dyn Reducer<A, S, E>>,
}

impl<A, S, E> MessageLifter<A, S, E> {
    pub(crate) fn new(inner: Arc<dyn Reducer<A, S, E>>) -> Self {
        Self { inner }
    }
}

impl<A, S, E> Reducer<Message<A, S>, S, E> for MessageLifter<A, S, E>
where
    A: Send + 'static,
    S: Send + 'static,
    E: 'static,
{
    fn reduce(
        &self,
        message: Message<A, S>,
        state: &mut S,
        env: &E,
    ) -> anyhow::Result<Effect<Message<A, S>>> {
        match message {
            Message::Action(action) => Ok(self.inner.reduce(action, state, env)?.map(Message::Action)),
            Message::StateReplace(replacement) => {
                *state = replacement;
                Ok(Effect::none())
            }
        }
    }
}
