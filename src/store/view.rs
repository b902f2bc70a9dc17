//! The view store: UI-facing entry point tying owner, mirror and bridge together.

use std::rc::Rc;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::StoreConfig;
use crate::error::StoreError;

use super::binding::Binding;
use super::bridge::spawn_bridge;
use super::message::{Message, MessageLifter};
use super::mirror::{MirrorSubscription, ObservableMirror};
use super::owner::{OwnerClient, StateOwner};
use super::proxy::{ObservedStore, ViewProxy};
use super::reducer::{reduce_guarded, Reducer};
use super::task::{DispatchOptions, StoreTask};

/// Synchronous, single-threaded view over an asynchronously owned state.
///
/// Reads hit the local mirror and never block. Dispatches are applied by a
/// state owner task; published results flow back into the mirror through a
/// bridge task. Clones share the same store.
///
/// Must be created inside a [`tokio::task::LocalSet`]: the bridge runs as a
/// local task next to the mirror it writes.
///
/// With `updates_state_immediately` the reducer also runs locally on
/// dispatch so the mirror changes at once. That preview only converges with
/// the owner's result when the reducer is deterministic.
pub struct ViewStore<A, S, E = ()> {
    inner: Rc<StoreInner<A, S, E>>,
}

struct StoreInner<A, S, E> {
    mirror: ObservableMirror<S>,
    owner: OwnerClient<Message<A, S>, S>,
    reducer: Arc<dyn Reducer<A, S, E>>,
    env: Arc<E>,
    config: StoreConfig,
    bridge: CancellationToken,
}

impl<A, S, E> Drop for StoreInner<A, S, E> {
    fn drop(&mut self) {
        self.bridge.cancel();
    }
}

impl<A, S, E> Clone for ViewStore<A, S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A, S> ViewStore<A, S, ()>
where
    A: Clone + Send + 'static,
    S: Clone + Send + 'static,
{
    /// Store with no environment and the default configuration.
    pub fn with_defaults(initial: S, reducer: impl Reducer<A, S, ()>) -> Self {
        Self::new(initial, reducer, (), StoreConfig::default())
    }
}

impl<A, S, E> ViewStore<A, S, E>
where
    A: Clone + Send + 'static,
    S: Clone + Send + 'static,
    E: Send + Sync + 'static,
{
    pub fn new(initial: S, reducer: impl Reducer<A, S, E>, env: E, config: StoreConfig) -> Self {
        let reducer: Arc<dyn Reducer<A, S, E>> = Arc::new(reducer);
        let env = Arc::new(env);
        let owner = StateOwner::spawn(
            initial.clone(),
            MessageLifter::new(Arc::clone(&reducer)),
            Arc::clone(&env),
        );
        let mirror = ObservableMirror::new(initial);
        let bridge = CancellationToken::new();
        spawn_bridge(&mirror, owner.subscribe(), bridge.clone());

        tracing::debug!(
            updates_state_immediately = config.updates_state_immediately,
            "View store created"
        );

        Self {
            inner: Rc::new(StoreInner {
                mirror,
                owner,
                reducer,
                env,
                config,
                bridge,
            }),
        }
    }

    /// Current mirror value.
    pub fn state(&self) -> S {
        self.inner.mirror.get()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.inner.mirror.with(f)
    }

    /// Canonical state as seen by the owner, after every queued message.
    pub async fn canonical_state(&self) -> Result<S, StoreError> {
        self.inner.owner.snapshot().await
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn env(&self) -> &E {
        &self.inner.env
    }

    pub fn dispatch(&self, action: A) -> StoreTask {
        self.dispatch_with(action, DispatchOptions::default())
    }

    pub fn dispatch_with(&self, action: A, options: DispatchOptions) -> StoreTask {
        if self.inner.config.updates_state_immediately {
            self.preview(action.clone());
        }
        self.inner.owner.send(Message::Action(action), options)
    }

    /// Run the reducer against the mirror, discarding its effect.
    fn preview(&self, action: A) {
        let mut next = self.inner.mirror.get();
        match reduce_guarded(&*self.inner.reducer, action, &mut next, &*self.inner.env) {
            Ok(_discarded) => self.inner.mirror.set(next),
            Err(err) => {
                tracing::debug!(error = %format!("{err:#}"), "Optimistic reduce failed; mirror unchanged");
            }
        }
    }

    /// Overwrite the mirror now and canonical state asynchronously.
    fn write_through(&self, state: S) -> StoreTask {
        self.inner.mirror.set(state.clone());
        self.inner
            .owner
            .send(Message::StateReplace(state), DispatchOptions::default())
    }

    /// Two-way binding over the whole state.
    pub fn bind(&self) -> Binding<S> {
        let reader = self.clone();
        let writer = self.clone();
        Binding::new(move || reader.state(), move |state| writer.write_through(state))
    }

    /// Two-way binding over a part of the state.
    ///
    /// Writes apply `set` to a copy of the current mirror value and send the
    /// whole result through the overwrite path.
    pub fn bind_field<T: 'static>(
        &self,
        get: impl Fn(&S) -> T + 'static,
        set: impl Fn(&mut S, T) + 'static,
    ) -> Binding<T> {
        let reader = self.clone();
        let writer = self.clone();
        Binding::new(
            move || reader.with_state(|state| get(state)),
            move |value| {
                let mut next = writer.state();
                set(&mut next, value);
                writer.write_through(next)
            },
        )
    }

    /// Call `observer` after every mirror change.
    pub fn subscribe(&self, observer: impl Fn(&S) + 'static) -> MirrorSubscription {
        self.inner.mirror.subscribe(observer)
    }

    /// Restricted `{state, bind, dispatch}` view for passing down a
    /// component tree.
    pub fn proxy(&self) -> ViewProxy<A, S> {
        let reader = self.clone();
        let writer = self.clone();
        let sender = self.clone();
        ViewProxy::new(
            move || reader.state(),
            move |state| writer.write_through(state),
            move |action, options| sender.dispatch_with(action, options),
        )
    }

    /// Observer-only `{subscribe, updates, dispatch}` view.
    pub fn observed(&self) -> ObservedStore<A, S> {
        let sender = self.clone();
        ObservedStore::new(
            self.inner.mirror.clone(),
            self.inner.owner.clone(),
            move |action, options| sender.dispatch_with(action, options),
        )
    }
}
