// Library exports for par-fmt.
//
// # Mutex Usage Policy
//
// par-fmt uses two mutex types for different concurrency scenarios.
// New code should follow these rules:
//
//   - `tokio::sync::Mutex`   — use for state locked from async tasks and
//                              held across awaits (the coordinator's pending
//                              table and channel slot).
//
//   - `parking_lot::Mutex`   — use for sync-only state where you need a
//                              fast, non-async lock (debounce burst state,
//                              option store contents and subscriber lists).
//                              Callbacks are always invoked after the lock
//                              is released.

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use par_fmt_config as config;

pub mod coordinator;
pub mod engine;
pub mod language;
pub mod samples;
pub mod session;
