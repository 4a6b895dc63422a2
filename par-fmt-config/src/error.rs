//! Typed error variants for the par-fmt-config crate.
//!
//! Provides structured error types for store mutation and option-text
//! parsing so callers at the crate boundary can match on specific failure
//! modes instead of opaque `anyhow` strings.

use thiserror::Error;

/// Errors produced by [`ConfigStore`](crate::ConfigStore) mutation and by
/// the option-text parser.
///
/// `load_from_text` never surfaces these to callers (it reports failure via
/// its boolean return); `set` and `merge` do, so a bad key or value can be
/// rejected without touching store state.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The key is not part of the option catalog.
    #[error("unknown option key '{0}'")]
    UnknownKey(String),

    /// The value's type or content does not fit the option's spec.
    #[error("invalid value for '{key}': {details}")]
    InvalidValue {
        /// Option key the value was offered for.
        key: String,
        /// Human-readable description of the mismatch.
        details: String,
    },

    /// The option text was not valid YAML.
    #[error("option text parse error: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// The option text parsed, but its top level is not a key/value mapping.
    #[error("option text is not a key/value mapping")]
    NotAMapping,
}
