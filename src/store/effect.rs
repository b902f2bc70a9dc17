//! Deferred effect units and the emitter they report follow-up actions through.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

pub(crate) type EffectRun<A> = Box<dyn FnOnce(Emitter<A>) -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// Sink for follow-up actions produced by a running effect.
///
/// Emitting is synchronous: the action is queued for the state owner
/// immediately. `send` returns `false` once the owning task has been
/// cancelled or the owner is gone, after which further emits are ignored.
pub struct Emitter<A> {
    sink: Arc<dyn Fn(A) -> bool + Send + Sync>,
}

impl<A> Clone for Emitter<A> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<A: Send + 'static> Emitter<A> {
    pub(crate) fn new(sink: impl Fn(A) -> bool + Send + Sync + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// Queue a follow-up action. Returns whether it was accepted.
    pub fn send(&self, action: A) -> bool {
        (self.sink)(action)
    }

    fn contramap<B: Send + 'static>(self, f: Arc<dyn Fn(B) -> A + Send + Sync>) -> Emitter<B> {
        Emitter {
            sink: Arc::new(move |action: B| (self.sink)(f(action))),
        }
    }
}

/// Deferred asynchronous work returned by a reducer.
///
/// An effect is a set of independent units. Nothing runs until the
/// supervisor spawns the units, so dropping an effect (as the optimistic
/// mirror path does) discards the work without side effects.
pub struct Effect<A> {
    runs: Vec<EffectRun<A>>,
}

impl<A> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("units", &self.runs.len())
            .finish()
    }
}

impl<A> Default for Effect<A> {
    fn default() -> Self {
        Self { runs: Vec::new() }
    }
}

impl<A: Send + 'static> Effect<A> {
    /// No follow-up work.
    pub fn none() -> Self {
        Self::default()
    }

    /// Feed `action` straight back into the store.
    pub fn send(action: A) -> Self {
        Self::run(move |emit| async move {
            emit.send(action);
            Ok(())
        })
    }

    /// Await `future` and feed its action back, if any.
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = Option<A>> + Send + 'static,
    {
        Self::run(move |emit| async move {
            if let Some(action) = future.await {
                emit.send(action);
            }
            Ok(())
        })
    }

    /// Like [`Effect::future`], but the work can fail.
    pub fn try_future<F>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<Option<A>>> + Send + 'static,
    {
        Self::run(move |emit| async move {
            if let Some(action) = future.await? {
                emit.send(action);
            }
            Ok(())
        })
    }

    /// General form: the unit receives an [`Emitter`] and may emit any
    /// number of actions while it runs.
    pub fn run<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Emitter<A>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let run: EffectRun<A> = Box::new(move |emit: Emitter<A>| f(emit).boxed());
        Self { runs: vec![run] }
    }

    /// Combine several effects into one whose units run concurrently.
    pub fn merge(effects: impl IntoIterator<Item = Effect<A>>) -> Self {
        let runs = effects.into_iter().flat_map(|effect| effect.runs).collect();
        Self { runs }
    }

    /// Append the units of `other`.
    pub fn and(mut self, other: Effect<A>) -> Self {
        self.runs.extend(other.runs);
        self
    }

    /// Number of independent units.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Transform every action the units emit.
    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let f: Arc<dyn Fn(A) -> B + Send + Sync> = Arc::new(f);
        let runs = self
            .runs
            .into_iter()
            .map(|run| {
                let f = Arc::clone(&f);
                Box::new(move |emit: Emitter<B>| run(emit.contramap(f))) as EffectRun<B>
            })
            .collect();
        Effect { runs }
    }

    pub(crate) fn into_runs(self) -> Vec<EffectRun<A>> {
        self.runs
    }
}
