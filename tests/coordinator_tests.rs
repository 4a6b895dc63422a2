//! Integration tests for the formatting coordinator and debouncer.
//!
//! These tests drive the coordinator with scripted engines to verify id
//! correlation, timeouts, channel recovery, shutdown, and debounce
//! collapsing.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use par_fmt::config::FormatOptions;
use par_fmt::coordinator::{
    DEFAULT_DEBOUNCE, DEFAULT_TIMEOUT, FailureKind, FormatCoordinator, FormatDebouncer,
};
use par_fmt::engine::{EngineError, FormatEngine, ReindentEngine};
use par_fmt::language::Language;

// ---------------------------------------------------------------------------
// Scripted engines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CapturedCall {
    source: String,
    file_hint: String,
    options: String,
}

/// Records every call and answers with a tagged copy of the source.
#[derive(Default)]
struct RecordingEngine {
    calls: AtomicUsize,
    last: Mutex<Option<CapturedCall>>,
}

impl RecordingEngine {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last(&self) -> CapturedCall {
        self.last.lock().clone().expect("engine was never called")
    }
}

impl FormatEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn format(
        &self,
        source: &str,
        file_hint: &str,
        options: &str,
    ) -> Result<String, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock() = Some(CapturedCall {
            source: source.to_string(),
            file_hint: file_hint.to_string(),
            options: options.to_string(),
        });
        Ok(format!("formatted::{source}"))
    }
}

/// Blocks for a fixed delay before answering.
struct SlowEngine {
    delay: Duration,
}

impl FormatEngine for SlowEngine {
    fn name(&self) -> &str {
        "slow"
    }

    fn format(
        &self,
        _source: &str,
        _file_hint: &str,
        _options: &str,
    ) -> Result<String, EngineError> {
        std::thread::sleep(self.delay);
        Ok("slow result".to_string())
    }
}

/// Blocks on the first call only, then answers promptly.
#[derive(Default)]
struct SlowThenFastEngine {
    calls: AtomicUsize,
}

impl FormatEngine for SlowThenFastEngine {
    fn name(&self) -> &str {
        "slow-then-fast"
    }

    fn format(
        &self,
        _source: &str,
        _file_hint: &str,
        _options: &str,
    ) -> Result<String, EngineError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            std::thread::sleep(Duration::from_millis(150));
            Ok("slow result".to_string())
        } else {
            Ok("fast result".to_string())
        }
    }
}

/// Always reports a format error.
struct FailingEngine;

impl FormatEngine for FailingEngine {
    fn name(&self) -> &str {
        "failing"
    }

    fn format(
        &self,
        _source: &str,
        _file_hint: &str,
        _options: &str,
    ) -> Result<String, EngineError> {
        Err(EngineError::Format("scripted failure".to_string()))
    }
}

/// Fails its first initialization, succeeds afterwards, and records every
/// source it formats.
#[derive(Default)]
struct FlakyInitEngine {
    init_calls: AtomicUsize,
    formatted: Mutex<Vec<String>>,
}

impl FlakyInitEngine {
    fn formatted(&self) -> Vec<String> {
        self.formatted.lock().clone()
    }
}

impl FormatEngine for FlakyInitEngine {
    fn name(&self) -> &str {
        "flaky-init"
    }

    fn initialize(&self) -> Result<(), EngineError> {
        if self.init_calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(EngineError::Init("scripted init failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn format(
        &self,
        source: &str,
        _file_hint: &str,
        _options: &str,
    ) -> Result<String, EngineError> {
        self.formatted.lock().push(source.to_string());
        Ok(format!("recovered::{source}"))
    }
}

fn baseline() -> FormatOptions {
    par_fmt::config::schema::baseline()
}

// ---------------------------------------------------------------------------
// Coordinator tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_submit_round_trip_with_reindent_engine() {
    let coordinator = FormatCoordinator::new(Arc::new(ReindentEngine::new()));
    let result = coordinator
        .submit("int main() {\nreturn 0;\n}", &baseline(), Language::Cpp)
        .await
        .unwrap();

    assert_eq!(result.formatted_text, "int main() {\n  return 0;\n}");
    assert_eq!(coordinator.pending_count().await, 0);
}

#[tokio::test]
async fn test_empty_source_never_reaches_engine() {
    let engine = Arc::new(RecordingEngine::default());
    let coordinator = FormatCoordinator::new(engine.clone());

    let result = coordinator
        .submit("  \n\t  ", &baseline(), Language::Cpp)
        .await
        .unwrap();

    assert_eq!(result.formatted_text, "");
    assert_eq!(result.elapsed_millis, 0);
    assert_eq!(engine.calls(), 0, "blank source must not hit the engine");
}

#[tokio::test]
async fn test_request_carries_wire_options_and_file_hint() {
    let engine = Arc::new(RecordingEngine::default());
    let coordinator = FormatCoordinator::new(engine.clone());

    coordinator
        .submit("int x;", &baseline(), Language::C)
        .await
        .unwrap();

    let call = engine.last();
    assert_eq!(call.source, "int x;");
    assert_eq!(call.file_hint, "main.c");
    assert!(call.options.starts_with('{') && call.options.ends_with('}'));
    assert!(call.options.contains("BasedOnStyle: LLVM"));
    assert!(call.options.contains("IndentWidth: 2"));
    assert!(!call.options.contains('\n'), "wire mapping is single-line");
}

#[tokio::test]
async fn test_responses_correlate_to_their_requests() {
    let engine = Arc::new(RecordingEngine::default());
    let coordinator = FormatCoordinator::new(engine.clone());
    let opts = baseline();

    let (first, second) = tokio::join!(
        coordinator.submit("first", &opts, Language::Cpp),
        coordinator.submit("second", &opts, Language::Cpp),
    );

    assert_eq!(first.unwrap().formatted_text, "formatted::first");
    assert_eq!(second.unwrap().formatted_text, "formatted::second");
    assert_eq!(engine.calls(), 2);
    assert_eq!(coordinator.pending_count().await, 0);
}

#[tokio::test]
async fn test_engine_error_maps_to_failure() {
    let coordinator = FormatCoordinator::new(Arc::new(FailingEngine));

    let failure = coordinator
        .submit("int x;", &baseline(), Language::Cpp)
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::EngineError);
    assert!(failure.message.contains("scripted failure"));
    assert_eq!(coordinator.pending_count().await, 0);
}

#[tokio::test]
async fn test_timeout_removes_pending_request() {
    let coordinator = FormatCoordinator::with_timeout(
        Arc::new(SlowEngine {
            delay: Duration::from_millis(200),
        }),
        Duration::from_millis(50),
    );

    let failure = coordinator
        .submit("int x;", &baseline(), Language::Cpp)
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::Timeout);
    assert!(failure.message.contains("50"));
    assert_eq!(
        coordinator.pending_count().await,
        0,
        "timed-out request must be forgotten"
    );
}

#[tokio::test]
async fn test_late_response_discarded_and_channel_stays_usable() {
    let engine = Arc::new(SlowThenFastEngine::default());
    let coordinator =
        FormatCoordinator::with_timeout(engine.clone(), Duration::from_millis(50));
    let opts = baseline();

    let failure = coordinator
        .submit("one", &opts, Language::Cpp)
        .await
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::Timeout);

    // Let the slow response arrive for the forgotten id.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(coordinator.pending_count().await, 0);

    // A fresh submission gets its own answer, not the stale one.
    let result = coordinator.submit("two", &opts, Language::Cpp).await.unwrap();
    assert_eq!(result.formatted_text, "fast result");
    assert_eq!(engine.calls.load(Ordering::SeqCst), 2, "both calls reached the engine");
}

#[tokio::test]
async fn test_channel_respawns_after_init_failure() {
    let engine = Arc::new(FlakyInitEngine::default());
    let coordinator = FormatCoordinator::new(engine.clone());
    let opts = baseline();

    let failure = coordinator
        .submit("int x;", &opts, Language::Cpp)
        .await
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::EngineUnavailable);
    assert_eq!(coordinator.pending_count().await, 0);

    let result = coordinator.submit("int x;", &opts, Language::Cpp).await.unwrap();
    assert_eq!(result.formatted_text, "recovered::int x;");
    assert_eq!(engine.init_calls.load(Ordering::SeqCst), 2);
}

/// Verify requests landing on a freshly respawned channel are served by it
/// and never failed by the dead channel's teardown.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_respawn_does_not_fail_requests_on_the_new_channel() {
    let opts = baseline();

    for round in 0..100 {
        let engine = Arc::new(FlakyInitEngine::default());
        let coordinator = Arc::new(FormatCoordinator::new(engine.clone()));

        let sources = ["int a;", "int b;", "int c;", "int d;"];
        let submits = sources.map(|source| {
            let coordinator = Arc::clone(&coordinator);
            let opts = opts.clone();
            tokio::spawn(async move { coordinator.submit(source, &opts, Language::Cpp).await })
        });

        for (source, submit) in sources.iter().zip(submits) {
            match submit.await.unwrap() {
                Ok(result) => {
                    assert_eq!(result.formatted_text, format!("recovered::{source}"));
                }
                // Only requests that rode the dead first channel may fail,
                // and the engine never saw those.
                Err(failure) => {
                    assert_eq!(
                        failure.kind,
                        FailureKind::EngineUnavailable,
                        "round {round}: unexpected failure {failure}"
                    );
                    assert!(
                        !engine.formatted().contains(&source.to_string()),
                        "round {round}: {source:?} was formatted by the \
                         replacement channel yet reported unavailable"
                    );
                }
            }
        }
    }
}

#[tokio::test]
async fn test_shutdown_cancels_in_flight_request() {
    let coordinator = Arc::new(FormatCoordinator::new(Arc::new(SlowEngine {
        delay: Duration::from_millis(300),
    })));

    let submit = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            coordinator
                .submit("int x;", &baseline(), Language::Cpp)
                .await
        })
    };

    // Let the request register and reach the engine.
    tokio::time::sleep(Duration::from_millis(50)).await;
    coordinator.shutdown().await;

    let failure = submit.await.unwrap().unwrap_err();
    assert_eq!(failure.kind, FailureKind::Cancelled);
    assert_eq!(coordinator.pending_count().await, 0);

    // Shut down means shut down: later submissions are refused too.
    let failure = coordinator
        .submit("int y;", &baseline(), Language::Cpp)
        .await
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::Cancelled);
}

// ---------------------------------------------------------------------------
// Debouncer tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_debounce_collapses_burst_to_last_arguments() {
    let engine = Arc::new(RecordingEngine::default());
    let coordinator = Arc::new(FormatCoordinator::new(engine.clone()));
    let debouncer = FormatDebouncer::with_window(coordinator, Duration::from_millis(50));
    let opts = baseline();

    let (first, second, third) = tokio::join!(
        debouncer.submit("first", &opts, Language::Cpp),
        debouncer.submit("second", &opts, Language::Cpp),
        debouncer.submit("third", &opts, Language::Cpp),
    );

    let result = third.clone().unwrap();
    assert_eq!(result.formatted_text, "formatted::third");
    assert_eq!(first, third, "collapsed calls settle with the burst outcome");
    assert_eq!(second, third, "collapsed calls settle with the burst outcome");
    assert_eq!(engine.calls(), 1, "a burst dispatches exactly once");
    assert_eq!(engine.last().source, "third");
}

#[tokio::test]
async fn test_debounce_dispatches_separate_bursts() {
    let engine = Arc::new(RecordingEngine::default());
    let coordinator = Arc::new(FormatCoordinator::new(engine.clone()));
    let debouncer = FormatDebouncer::with_window(coordinator, Duration::from_millis(20));
    let opts = baseline();

    let alpha = debouncer.submit("alpha", &opts, Language::Cpp).await.unwrap();
    let beta = debouncer.submit("beta", &opts, Language::Cpp).await.unwrap();

    assert_eq!(alpha.formatted_text, "formatted::alpha");
    assert_eq!(beta.formatted_text, "formatted::beta");
    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn test_debounce_propagates_failures_to_all_waiters() {
    let coordinator = Arc::new(FormatCoordinator::new(Arc::new(FailingEngine)));
    let debouncer = FormatDebouncer::with_window(coordinator, Duration::from_millis(30));
    let opts = baseline();

    let (first, second) = tokio::join!(
        debouncer.submit("first", &opts, Language::Cpp),
        debouncer.submit("second", &opts, Language::Cpp),
    );

    assert_eq!(first.clone().unwrap_err().kind, FailureKind::EngineError);
    assert_eq!(first, second);
}

#[test]
fn test_default_tuning_constants() {
    assert_eq!(DEFAULT_DEBOUNCE, Duration::from_millis(300));
    assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(10));
}
