//! Debounced submissions for keystroke-driven callers.
//!
//! Rapid calls inside the quiet window collapse into a single engine
//! dispatch carrying the most recent arguments; every collapsed call
//! settles with that one outcome.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::coordinator::{FailureKind, FormatCoordinator, FormatFailure, FormatOutcome};
use crate::language::Language;
use par_fmt_config::FormatOptions;

/// Default quiet window before a burst is dispatched.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// The calls collected during one quiet window.
#[derive(Debug)]
struct PendingBurst {
    source_text: String,
    options: FormatOptions,
    language: Language,
    waiters: Vec<oneshot::Sender<FormatOutcome>>,
}

#[derive(Debug)]
struct BurstState {
    /// Bumped on every call; a delay task only dispatches if its
    /// generation is still current when it wakes.
    generation: u64,
    burst: Option<PendingBurst>,
}

/// Debounce wrapper around a [`FormatCoordinator`].
#[derive(Debug)]
pub struct FormatDebouncer {
    coordinator: Arc<FormatCoordinator>,
    window: Duration,
    state: Arc<Mutex<BurstState>>,
}

impl FormatDebouncer {
    /// Wrap `coordinator` with the default quiet window.
    pub fn new(coordinator: Arc<FormatCoordinator>) -> Self {
        Self::with_window(coordinator, DEFAULT_DEBOUNCE)
    }

    /// Wrap `coordinator` with a custom quiet window.
    pub fn with_window(coordinator: Arc<FormatCoordinator>, window: Duration) -> Self {
        Self {
            coordinator,
            window,
            state: Arc::new(Mutex::new(BurstState {
                generation: 0,
                burst: None,
            })),
        }
    }

    /// Submit through the debounce window and wait for the burst outcome.
    pub async fn submit(
        &self,
        source_text: &str,
        options: &FormatOptions,
        language: Language,
    ) -> FormatOutcome {
        let (tx, rx) = oneshot::channel();
        let my_generation = {
            let mut state = self.state.lock();
            state.generation += 1;
            match state.burst.as_mut() {
                Some(burst) => {
                    // Later calls overwrite the arguments; last one wins.
                    burst.source_text = source_text.to_string();
                    burst.options = options.clone();
                    burst.language = language;
                    burst.waiters.push(tx);
                }
                None => {
                    state.burst = Some(PendingBurst {
                        source_text: source_text.to_string(),
                        options: options.clone(),
                        language,
                        waiters: vec![tx],
                    });
                }
            }
            state.generation
        };

        let coordinator = Arc::clone(&self.coordinator);
        let state = Arc::clone(&self.state);
        let window = self.window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let burst = {
                let mut guard = state.lock();
                // A newer call restarted the window; its delay task owns
                // the dispatch now.
                if guard.generation != my_generation {
                    return;
                }
                guard.burst.take()
            };
            let Some(burst) = burst else { return };
            log::debug!(
                "Dispatching debounced format ({} collapsed call(s))",
                burst.waiters.len()
            );
            let outcome = coordinator
                .submit(&burst.source_text, &burst.options, burst.language)
                .await;
            for waiter in burst.waiters {
                let _ = waiter.send(outcome.clone());
            }
        });

        match rx.await {
            Ok(outcome) => outcome,
            // Only possible when the runtime tears down the delay task.
            Err(_) => Err(FormatFailure::new(
                FailureKind::Cancelled,
                "format request was dropped",
            )),
        }
    }

    /// The quiet window length.
    pub fn window(&self) -> Duration {
        self.window
    }
}
