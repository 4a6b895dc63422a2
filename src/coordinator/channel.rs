//! Engine channel: the task pair bridging the async coordinator to a
//! blocking [`FormatEngine`].
//!
//! A worker task owns the engine and serves requests strictly one at a
//! time; a router task resolves pending submissions by request id. Each
//! channel owns the pending table for the requests dispatched on it, so a
//! dead channel's teardown only ever fails its own requests and never
//! those of a replacement. If either side dies the channel is considered
//! closed and the coordinator spawns a fresh one on the next submission.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, mpsc, oneshot};

use crate::coordinator::{FailureKind, FormatFailure, FormatOutcome, FormatResult};
use crate::engine::{EngineError, FormatEngine};

/// Pending submissions awaiting an engine response, keyed by request id.
///
/// Each [`EngineChannel`] owns one; entries resolve or drain only through
/// that channel's router task, or through coordinator shutdown.
pub(crate) type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<FormatOutcome>>>>;

/// One request travelling to the engine worker.
#[derive(Debug)]
pub(crate) struct EngineRequest {
    pub id: u64,
    pub source_text: String,
    pub file_hint: String,
    pub options: String,
}

/// One response travelling back from the engine worker.
#[derive(Debug)]
struct EngineResponse {
    id: u64,
    outcome: Result<String, EngineError>,
    elapsed_millis: u64,
}

pub(crate) struct EngineChannel {
    request_tx: mpsc::UnboundedSender<EngineRequest>,
    pending: PendingMap,
}

impl EngineChannel {
    /// Spawn the worker/router pair for `engine`.
    ///
    /// The worker initializes the engine first; if that fails the worker
    /// exits, the channel reads as closed, and every request registered
    /// with this channel is drained by its router as unavailable.
    pub(crate) fn spawn(engine: Arc<dyn FormatEngine>) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<EngineRequest>();
        let (response_tx, mut response_rx) = mpsc::unbounded_channel::<EngineResponse>();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let router_pending = Arc::clone(&pending);

        tokio::spawn(async move {
            let init_engine = Arc::clone(&engine);
            match tokio::task::spawn_blocking(move || init_engine.initialize()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    log::error!("Engine initialization failed: {e}");
                    return;
                }
                Err(e) => {
                    log::error!("Engine initialization task panicked: {e}");
                    return;
                }
            }
            log::info!("Engine channel ready ({})", engine.name());

            while let Some(request) = request_rx.recv().await {
                let id = request.id;
                let call_engine = Arc::clone(&engine);
                let started = Instant::now();
                let outcome = match tokio::task::spawn_blocking(move || {
                    call_engine.format(&request.source_text, &request.file_hint, &request.options)
                })
                .await
                {
                    Ok(outcome) => outcome,
                    Err(e) => Err(EngineError::Format(format!("engine call panicked: {e}"))),
                };
                let elapsed_millis = started.elapsed().as_millis() as u64;
                if response_tx
                    .send(EngineResponse { id, outcome, elapsed_millis })
                    .is_err()
                {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            while let Some(response) = response_rx.recv().await {
                let outcome = match response.outcome {
                    Ok(formatted_text) => Ok(FormatResult {
                        formatted_text,
                        elapsed_millis: response.elapsed_millis,
                    }),
                    Err(e) => Err(FormatFailure::new(FailureKind::EngineError, e.to_string())),
                };
                let mut map = router_pending.lock().await;
                match map.remove(&response.id) {
                    // The receiver may be gone (submission timed out); that
                    // is fine.
                    Some(tx) => {
                        let _ = tx.send(outcome);
                    }
                    None => {
                        log::warn!("Discarding late response for request id {}", response.id);
                    }
                }
            }

            // Response stream closed: the worker is gone. Every submission
            // still registered with this channel will never get an answer.
            // Requests riding a replacement channel live in that channel's
            // own table and are untouched here.
            let mut map = router_pending.lock().await;
            if !map.is_empty() {
                log::error!(
                    "Engine channel closed with {} request(s) pending",
                    map.len()
                );
                for (_, tx) in map.drain() {
                    let _ = tx.send(Err(FormatFailure::new(
                        FailureKind::EngineUnavailable,
                        "engine channel closed",
                    )));
                }
            }
        });

        Self { request_tx, pending }
    }

    /// Queue a request for the worker. Returns false when the worker has
    /// exited.
    pub(crate) fn send(&self, request: EngineRequest) -> bool {
        self.request_tx.send(request).is_ok()
    }

    /// Whether the worker side of the channel is gone.
    pub(crate) fn is_closed(&self) -> bool {
        self.request_tx.is_closed()
    }

    /// The pending table for requests dispatched on this channel.
    pub(crate) fn pending(&self) -> &PendingMap {
        &self.pending
    }
}
