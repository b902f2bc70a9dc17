//! Owner → mirror synchronization.

use tokio_util::sync::CancellationToken;

use super::mirror::ObservableMirror;
use super::owner::StateStream;

/// Copy every published state into `mirror`, in order.
///
/// The first item of `updates` is the state the mirror was seeded with and
/// is skipped, so an optimistic write made before the bridge first runs is
/// not rolled back to the initial value.
///
/// Runs on the current `LocalSet`. The task holds only a weak reference to
/// the mirror and stops when the mirror is gone, the stream ends or
/// `teardown` is cancelled.
pub(crate) fn spawn_bridge<S: Clone + 'static>(
    mirror: &ObservableMirror<S>,
    mut updates: StateStream<S>,
    teardown: CancellationToken,
) {
    let mirror = mirror.downgrade();
    tokio::task::spawn_local(async move {
        let mut seeded = true;
        loop {
            tokio::select! {
                biased;
                _ = teardown.cancelled() => break,
                next = updates.recv() => {
                    let Some(state) = next else {
                        break;
                    };
                    if std::mem::take(&mut seeded) {
                        continue;
                    }
                    let Some(mirror) = ObservableMirror::upgrade(&mirror) else {
                        break;
                    };
                    mirror.set(state);
                }
            }
        }
        tracing::debug!("Mirror bridge stopped");
    });
}
