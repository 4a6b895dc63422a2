//! Formatting engine abstraction.
//!
//! An engine takes raw source text plus a serialized option mapping and
//! produces formatted text. Engines are synchronous; the coordinator runs
//! them on blocking worker threads.

pub mod reindent;

pub use reindent::ReindentEngine;

/// Errors an engine can report.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// One-time engine setup failed.
    #[error("engine initialization failed: {0}")]
    Init(String),
    /// The engine rejected or could not process the source text.
    #[error("format failed: {0}")]
    Format(String),
    /// The serialized option mapping could not be understood.
    #[error("invalid engine options: {0}")]
    InvalidOptions(String),
}

/// A source-text formatter.
///
/// Implementations must be `Send + Sync` for use across threads.
pub trait FormatEngine: Send + Sync {
    /// Short identifier for logs (e.g., "reindent").
    fn name(&self) -> &str;

    /// One-time setup before the first format call.
    ///
    /// Default is a no-op; engines that load external resources override
    /// this.
    fn initialize(&self) -> Result<(), EngineError> {
        Ok(())
    }

    /// Format `source` according to `options`, a single-line `{key: value}`
    /// mapping. `file_hint` is a file name the engine may use to pick
    /// language rules (e.g., "main.cpp").
    fn format(&self, source: &str, file_hint: &str, options: &str)
    -> Result<String, EngineError>;
}
