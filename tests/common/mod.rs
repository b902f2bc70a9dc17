//! Shared test utilities: a small counter domain and polling helpers.

#![allow(dead_code, unused_imports)]

use std::fmt::Debug;
use std::time::Duration;

use tokio::time::Instant;
use viewstore::{Effect, StoreConfig, ViewStore};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Counter {
    pub count: i64,
    /// Number of delayed increments requested so far.
    pub pending: u32,
    pub label: String,
}

#[derive(Debug, Clone)]
pub enum CounterAction {
    Increment,
    Add(i64),
    Rename(String),
    /// Record a request, then emit `Increment` after `delay`.
    IncrementLater(Duration),
    /// Emit the wrapped action straight back.
    Relay(Box<CounterAction>),
    /// One unit fails, its sibling emits `Increment` after a short delay.
    FailBesideIncrement,
    /// The single effect unit panics.
    PanicInEffect,
    /// Mutate, then fail.
    Reject,
}

pub fn counter_reducer(
    action: CounterAction,
    state: &mut Counter,
    _env: &(),
) -> anyhow::Result<Effect<CounterAction>> {
    match action {
        CounterAction::Increment => {
            state.count += 1;
            Ok(Effect::none())
        }
        CounterAction::Add(n) => {
            state.count += n;
            Ok(Effect::none())
        }
        CounterAction::Rename(label) => {
            state.label = label;
            Ok(Effect::none())
        }
        CounterAction::IncrementLater(delay) => {
            state.pending += 1;
            Ok(Effect::future(async move {
                tokio::time::sleep(delay).await;
                Some(CounterAction::Increment)
            }))
        }
        CounterAction::Relay(inner) => Ok(Effect::send(*inner)),
        CounterAction::FailBesideIncrement => Ok(Effect::try_future(async {
            Err::<Option<CounterAction>, _>(anyhow::anyhow!("upstream unavailable"))
        })
        .and(Effect::future(async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Some(CounterAction::Increment)
        }))),
        CounterAction::PanicInEffect => Ok(Effect::run(|_emit| async { explode() })),
        CounterAction::Reject => {
            state.count = -1;
            anyhow::bail!("rejected")
        }
    }
}

fn explode() -> anyhow::Result<()> {
    panic!("effect blew up")
}

/// Counter store with the default (optimistic) configuration.
pub fn counter_store() -> ViewStore<CounterAction, Counter> {
    ViewStore::with_defaults(Counter::default(), counter_reducer)
}

/// Counter store that only updates the mirror from published states.
pub fn pessimistic_store() -> ViewStore<CounterAction, Counter> {
    ViewStore::new(
        Counter::default(),
        counter_reducer,
        (),
        StoreConfig::default().with_updates_state_immediately(false),
    )
}

/// Left-fold of the reducer over `actions`, discarding effects.
pub fn fold(initial: Counter, actions: &[CounterAction]) -> Counter {
    actions.iter().cloned().fold(initial, |mut state, action| {
        let _ = counter_reducer(action, &mut state, &());
        state
    })
}

/// Poll `read` until `done` holds, panicking after two seconds.
pub async fn eventually<T: Debug>(read: impl Fn() -> T, done: impl Fn(&T) -> bool) -> T {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let value = read();
        if done(&value) {
            return value;
        }
        if Instant::now() >= deadline {
            panic!("condition not reached, last value: {value:?}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
