//! Formatting request coordination.
//!
//! [`FormatCoordinator`] owns the engine channel and matches responses to
//! submissions by request id. Each submission gets a per-request timeout;
//! a dead channel is replaced on the next submission; shutdown cancels
//! everything still pending and refuses further work.

mod channel;
pub mod debounce;

pub use debounce::{DEFAULT_DEBOUNCE, FormatDebouncer};

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, oneshot};

use crate::engine::FormatEngine;
use crate::language::Language;
use channel::{EngineChannel, EngineRequest, PendingMap};
use par_fmt_config::FormatOptions;

/// Default wall-clock budget for a single formatting request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a formatting request did not produce a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The engine could not be reached (channel dead or setup failed).
    EngineUnavailable,
    /// No response arrived within the per-request budget.
    Timeout,
    /// The engine answered with an error.
    EngineError,
    /// The coordinator was shut down before the request completed.
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::EngineUnavailable => write!(f, "engine unavailable"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::EngineError => write!(f, "engine error"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A failed formatting request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FormatFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl FormatFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A successful formatting request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    /// The formatted source text.
    pub formatted_text: String,
    /// Engine processing time, in whole milliseconds.
    pub elapsed_millis: u64,
}

/// What a submission settles with.
pub type FormatOutcome = Result<FormatResult, FormatFailure>;

/// Coordinates formatting requests against one engine.
///
/// The engine runs behind a channel of two tasks (see [`channel`]); the
/// coordinator never calls it directly. At most one engine call is in
/// flight at a time.
pub struct FormatCoordinator {
    engine: Arc<dyn FormatEngine>,
    timeout: Duration,
    /// Monotonic request id source.
    next_id: AtomicU64,
    /// Live channel, if any. Replaced on demand after a failure. The
    /// channel owns the pending table for requests dispatched on it.
    channel: Mutex<Option<EngineChannel>>,
    /// Set once by [`shutdown`](Self::shutdown); never cleared.
    shut_down: AtomicBool,
}

impl FormatCoordinator {
    /// Create a coordinator with the default per-request timeout.
    pub fn new(engine: Arc<dyn FormatEngine>) -> Self {
        Self::with_timeout(engine, DEFAULT_TIMEOUT)
    }

    /// Create a coordinator with a custom per-request timeout.
    pub fn with_timeout(engine: Arc<dyn FormatEngine>, timeout: Duration) -> Self {
        Self {
            engine,
            timeout,
            next_id: AtomicU64::new(1),
            channel: Mutex::new(None),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Submit one formatting request and wait for its outcome.
    ///
    /// Source that trims to empty resolves immediately with an empty result
    /// and zero elapsed time; the engine is not consulted.
    pub async fn submit(
        &self,
        source_text: &str,
        options: &FormatOptions,
        language: Language,
    ) -> FormatOutcome {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(FormatFailure::new(
                FailureKind::Cancelled,
                "coordinator is shut down",
            ));
        }
        if source_text.trim().is_empty() {
            return Ok(FormatResult {
                formatted_text: String::new(),
                elapsed_millis: 0,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();

        let request = EngineRequest {
            id,
            source_text: source_text.to_string(),
            file_hint: language.file_hint().to_string(),
            options: options.to_wire(),
        };
        let pending = self.dispatch(id, tx, request).await?;

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            // Sender dropped without settling; treat as a dead channel.
            Ok(Err(_)) => Err(FormatFailure::new(
                FailureKind::EngineUnavailable,
                "response channel dropped",
            )),
            Err(_) => {
                // Forget the request so a late response is discarded.
                pending.lock().await.remove(&id);
                Err(FormatFailure::new(
                    FailureKind::Timeout,
                    format!("no response within {} ms", self.timeout.as_millis()),
                ))
            }
        }
    }

    /// Register a submission and hand its request to the engine channel,
    /// spawning a fresh channel when there is none or the previous one
    /// died.
    ///
    /// The entry is registered, under the channel lock, in the pending
    /// table of the channel that carries the request; a channel that died
    /// earlier holds a different table and cannot drain the new entry.
    /// Returns that table so the caller can forget the entry on timeout.
    async fn dispatch(
        &self,
        id: u64,
        tx: oneshot::Sender<FormatOutcome>,
        request: EngineRequest,
    ) -> Result<PendingMap, FormatFailure> {
        let mut guard = self.channel.lock().await;
        // Checked under the lock so a concurrent shutdown cannot be
        // outraced by a respawn.
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(FormatFailure::new(
                FailureKind::Cancelled,
                "coordinator is shut down",
            ));
        }
        if guard.as_ref().is_none_or(EngineChannel::is_closed) {
            log::info!("Starting engine channel ({})", self.engine.name());
            *guard = Some(EngineChannel::spawn(Arc::clone(&self.engine)));
        }
        if let Some(ch) = guard.as_ref() {
            // Register the pending request before sending so the response
            // cannot arrive first.
            ch.pending().lock().await.insert(id, tx);
            if ch.send(request) {
                return Ok(Arc::clone(ch.pending()));
            }
            ch.pending().lock().await.remove(&id);
        }
        Err(FormatFailure::new(
            FailureKind::EngineUnavailable,
            "engine channel closed",
        ))
    }

    /// Cancel all pending requests and refuse any further submissions.
    ///
    /// Idempotent.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let channel = self.channel.lock().await.take();
        if let Some(channel) = channel {
            // The channel is still held here, so its router cannot reach
            // end-of-stream and drain these entries before we cancel them.
            {
                let mut map = channel.pending().lock().await;
                if !map.is_empty() {
                    log::info!("Cancelling {} pending format request(s)", map.len());
                }
                for (_, tx) in map.drain() {
                    let _ = tx.send(Err(FormatFailure::new(
                        FailureKind::Cancelled,
                        "coordinator shut down",
                    )));
                }
            }
            // Dropping the channel lets the worker and router tasks wind
            // down.
            drop(channel);
        }
    }

    /// Whether [`shutdown`](Self::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Number of submissions awaiting a response from the live channel.
    /// Diagnostic.
    pub async fn pending_count(&self) -> usize {
        match self.channel.lock().await.as_ref() {
            Some(channel) => channel.pending().lock().await.len(),
            None => 0,
        }
    }
}

impl fmt::Debug for FormatCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatCoordinator")
            .field("engine", &self.engine.name())
            .field("timeout", &self.timeout)
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}
