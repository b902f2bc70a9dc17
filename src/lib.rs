//! Synchronization bridge between an asynchronous, serialized state owner and
//! a synchronous observable mirror, with per-dispatch effect tasks.

pub mod config;
pub mod error;
pub mod logging;
pub mod store;

pub use config::{ConfigError, StoreConfig};
pub use error::StoreError;
pub use store::{
    Binding, DispatchOptions, Effect, Emitter, ObservedStore, Priority, Reducer, StoreTask,
    ViewProxy, ViewStore,
};
