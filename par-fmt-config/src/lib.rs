//! par-fmt-config: formatter option schema, store, and persistence.
//!
//! This crate owns the configuration half of par-fmt. It includes:
//!
//! - The option catalog (keys, categories, defaults, enum choice sets)
//! - The ordered option mapping and value types
//! - The configuration store with validation, diffing, and synchronous
//!   change notification
//! - Dotfile export, engine wire serialization, and lenient import
//! - Blob persistence with baseline fallback

pub mod error;
pub mod options;
pub mod persistence;
pub mod schema;
pub mod serialize;
pub mod store;

// Re-export main types for convenience
pub use error::ConfigError;
pub use options::{FormatOptions, OptionValue};
pub use schema::{OptionCategory, OptionSpec};
pub use store::{ConfigDiff, ConfigStore, DiffEntry, SubscriberId};
