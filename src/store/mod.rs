//! Actor-owned state with a synchronous, UI-confined mirror.
//!
//! # Architecture
//!
//! ```text
//!            dispatch(action)                       binding.set(state)
//!                 │  (optional local reduce)              │  (mirror := state)
//!                 ▼                                       ▼
//!   Message::Action ──────────► StateOwner ◄──────── Message::StateReplace
//!                               │  reducer, one message at a time
//!                               │
//!              publish ─────────┼──────── effects ──► supervisor
//!                 │                                    │
//!                 ▼                                    └─► follow-up actions
//!            bridge task ──► ObservableMirror ──► state(), bind(), observers
//! ```
//!
//! - **StateOwner**: tokio task holding canonical state; FIFO, serialized.
//! - **MessageLifter**: lets the owner carry actions and overwrites alike.
//! - **Supervisor**: runs effects per message, tracks feedback, cancels.
//! - **ObservableMirror**: `Rc`-confined cache for synchronous reads.
//! - **Bridge**: local task copying published states into the mirror.

mod binding;
mod bridge;
mod effect;
mod message;
mod mirror;
mod owner;
mod proxy;
mod reducer;
mod supervisor;
mod task;
mod view;

pub use binding::Binding;
pub use effect::{Effect, Emitter};
pub use mirror::{MirrorSubscription, ObservableMirror};
pub use owner::{StateStream, PUBLISH_BUFFER};
pub use proxy::{ObservedStore, ViewProxy};
pub use reducer::Reducer;
pub use task::{DispatchOptions, Priority, StoreTask, TaskResult};
pub use view::ViewStore;
