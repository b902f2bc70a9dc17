//! Reducer trait for the store.

use std::panic::{self, AssertUnwindSafe};

use super::effect::Effect;

/// Reducer transforms state based on actions.
///
/// The reducer is the only place where state transitions happen.
/// It must be pure and deterministic: given the same action, state and
/// environment it must produce the same new state. Optimistic mirror updates
/// only converge with the owner's result when this holds.
///
/// Side effects are never performed here; they are described by the returned
/// [`Effect`] and run later by the supervisor.
pub trait Reducer<A, S, E>: Send + Sync + 'static {
    /// Apply `action` to `state`, returning the follow-up work to schedule.
    ///
    /// Returning `Err` reports a reducer failure on the dispatching task.
    /// The owner discards any partial mutation made before the error.
    fn reduce(&self, action: A, state: &mut S, env: &E) -> anyhow::Result<Effect<A>>;
}

impl<A, S, E, F> Reducer<A, S, E> for F
where
    F: Fn(A, &mut S, &E) -> anyhow::Result<Effect<A>> + Send + Sync + 'static,
{
    fn reduce(&self, action: A, state: &mut S, env: &E) -> anyhow::Result<Effect<A>> {
        self(action, state, env)
    }
}

/// Run `reducer`, reporting a panic as an ordinary reducer error.
///
/// `state` may be partially mutated afterwards; callers restore their own
/// snapshot on `Err`.
pub(crate) fn reduce_guarded<A, S, E, R>(
    reducer: &R,
    action: A,
    state: &mut S,
    env: &E,
) -> anyhow::Result<Effect<A>>
where
    R: Reducer<A, S, E> + ?Sized,
{
    match panic::catch_unwind(AssertUnwindSafe(|| reducer.reduce(action, state, env))) {
        Ok(result) => result,
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string payload".to_string());
            Err(anyhow::anyhow!("reducer panicked: {detail}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halve(n: u32, state: &mut u32, _env: &()) -> anyhow::Result<Effect<u32>> {
        if n == 0 {
            panic!("cannot halve by {n}");
        }
        *state /= n;
        Ok(Effect::none())
    }

    #[test]
    fn guarded_passes_results_through() {
        let mut state = 8;
        assert!(reduce_guarded(&halve, 2, &mut state, &()).is_ok());
        assert_eq!(state, 4);
    }

    #[test]
    fn guarded_turns_panic_into_error() {
        let mut state = 8;
        let err = reduce_guarded(&halve, 0, &mut state, &()).unwrap_err();
        assert_eq!(err.to_string(), "reducer panicked: cannot halve by 0");
    }

    #[test]
    fn guarded_works_through_trait_objects() {
        let reducer: &dyn Reducer<u32, u32, ()> = &halve;
        let mut state = 9;
        assert!(reduce_guarded(reducer, 0, &mut state, &()).is_err());
        assert_eq!(state, 9);
    }
}
