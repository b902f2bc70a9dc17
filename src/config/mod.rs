//! Store configuration and its loader.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::StoreConfig;
