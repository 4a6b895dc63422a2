//! The configuration store: single source of truth for formatter options.
//!
//! Holds the live option mapping, validates every mutation against the
//! catalog, and notifies subscribers synchronously whenever state actually
//! changes. Structurally equal writes are no-ops and produce no
//! notification, so observers never re-format for nothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::ConfigError;
use crate::options::{FormatOptions, OptionValue};
use crate::schema::{self, OptionSpec};
use crate::serialize;

// ---------------------------------------------------------------------------
// Diff types
// ---------------------------------------------------------------------------

/// One option whose current value differs from baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffEntry {
    /// Option key.
    pub key: String,
    /// Baseline default value.
    pub baseline: OptionValue,
    /// Current value.
    pub current: OptionValue,
}

/// Structural diff of the current mapping against baseline, in catalog
/// key order. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDiff {
    /// Changed entries in catalog order.
    pub changed: Vec<DiffEntry>,
}

impl ConfigDiff {
    /// Whether any option differs from baseline.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Number of changed options.
    pub fn len(&self) -> usize {
        self.changed.len()
    }
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

/// Handle identifying one subscription; used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type SubscriberFn = Arc<dyn Fn(&FormatOptions) + Send + Sync>;

struct Subscriber {
    id: SubscriberId,
    callback: SubscriberFn,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Owns the live [`FormatOptions`] mapping and the subscriber registry.
///
/// All mutation goes through [`set`](Self::set), [`merge`](Self::merge),
/// [`reset`](Self::reset), and [`load_from_text`](Self::load_from_text);
/// each real change produces exactly one synchronous notification carrying
/// a snapshot of the full updated mapping, delivered in subscriber
/// registration order. Callbacks run outside the state lock, so they may
/// read the store or unsubscribe themselves during delivery.
pub struct ConfigStore {
    catalog: Vec<OptionSpec>,
    baseline: FormatOptions,
    state: Mutex<FormatOptions>,
    subscribers: Mutex<Vec<Subscriber>>,
    next_subscriber_id: AtomicU64,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("options", &self.state.lock().len())
            .finish_non_exhaustive()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Create a store holding the baseline defaults.
    pub fn new() -> Self {
        let baseline = schema::baseline();
        Self {
            catalog: schema::catalog(),
            state: Mutex::new(baseline.clone()),
            baseline,
            subscribers: Mutex::new(Vec::new()),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    /// The baseline default mapping.
    pub fn baseline(&self) -> &FormatOptions {
        &self.baseline
    }

    /// The option catalog (keys, categories, defaults, choices).
    pub fn catalog(&self) -> &[OptionSpec] {
        &self.catalog
    }

    /// Copy of one option's current value.
    pub fn get(&self, key: &str) -> Option<OptionValue> {
        self.state.lock().get(key).cloned()
    }

    /// Copy of the full current mapping.
    pub fn get_all(&self) -> FormatOptions {
        self.state.lock().clone()
    }

    /// Update one option.
    ///
    /// A structurally equal value is a no-op with no notification. A real
    /// change notifies every subscriber once with the updated mapping.
    /// Unknown keys and out-of-spec values are rejected without touching
    /// state.
    pub fn set(&self, key: &str, value: OptionValue) -> Result<(), ConfigError> {
        let spec = schema::spec_for(&self.catalog, key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        schema::validate(spec, &value)?;

        let snapshot = {
            let mut state = self.state.lock();
            if state.get(key) == Some(&value) {
                return Ok(());
            }
            state.set_value(key, value);
            state.clone()
        };
        self.notify_subscribers(&snapshot);
        Ok(())
    }

    /// Apply several updates as one logical change.
    ///
    /// Every entry is validated before any is applied, so a bad key or
    /// value leaves the mapping untouched. At most one notification fires
    /// even when several keys change; none fires when nothing changes.
    pub fn merge(&self, updates: &[(&str, OptionValue)]) -> Result<(), ConfigError> {
        for (key, value) in updates {
            let spec = schema::spec_for(&self.catalog, key)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            schema::validate(spec, value)?;
        }

        let snapshot = {
            let mut state = self.state.lock();
            let mut changed = false;
            for (key, value) in updates {
                if state.get(key) != Some(value) {
                    state.set_value(key, value.clone());
                    changed = true;
                }
            }
            if !changed {
                return Ok(());
            }
            state.clone()
        };
        self.notify_subscribers(&snapshot);
        Ok(())
    }

    /// Restore the full mapping to baseline defaults.
    ///
    /// Notifies once; a store already at baseline stays silent.
    pub fn reset(&self) {
        let snapshot = {
            let mut state = self.state.lock();
            if *state == self.baseline {
                return;
            }
            *state = self.baseline.clone();
            state.clone()
        };
        self.notify_subscribers(&snapshot);
    }

    /// Structural diff of current values against baseline, in catalog order.
    pub fn diff(&self) -> ConfigDiff {
        let state = self.state.lock();
        let changed = self
            .baseline
            .iter()
            .filter_map(|(key, baseline_value)| {
                let current = state.get(key)?;
                (current != baseline_value).then(|| DiffEntry {
                    key: key.to_string(),
                    baseline: baseline_value.clone(),
                    current: current.clone(),
                })
            })
            .collect();
        ConfigDiff { changed }
    }

    /// Register a change observer; returns the handle for unsubscribing.
    ///
    /// Delivery order follows registration order.
    pub fn subscribe(
        &self,
        callback: impl Fn(&FormatOptions) + Send + Sync + 'static,
    ) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push(Subscriber {
            id,
            callback: Arc::new(callback),
        });
        id
    }

    /// Remove a subscription. Idempotent, and safe to call from inside a
    /// notification callback.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.lock().retain(|sub| sub.id != id);
    }

    /// Parse option text and merge the recognized keys over baseline.
    ///
    /// Returns false without mutating state when the text does not parse;
    /// unknown keys and mistyped values are skipped, not fatal. A
    /// successful load that actually changes the mapping notifies once.
    pub fn load_from_text(&self, text: &str) -> bool {
        let entries = match serialize::parse_options_text(text, &self.catalog) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Rejected option text: {e}");
                return false;
            }
        };

        let mut next = self.baseline.clone();
        for (key, value) in entries {
            next.set_value(&key, value);
        }

        let snapshot = {
            let mut state = self.state.lock();
            if *state == next {
                return true;
            }
            *state = next;
            state.clone()
        };
        self.notify_subscribers(&snapshot);
        true
    }

    /// Export the current mapping as dotfile text (`key: value` per line).
    pub fn to_text(&self) -> String {
        self.state.lock().to_text()
    }

    /// Serialize the current mapping to the engine wire form.
    pub fn to_wire(&self) -> String {
        self.state.lock().to_wire()
    }

    /// Deliver a snapshot to every subscriber, in registration order.
    ///
    /// The callback list is copied out first so callbacks can subscribe or
    /// unsubscribe without deadlocking; a subscriber removed mid-delivery
    /// may still see the in-flight notification.
    fn notify_subscribers(&self, snapshot: &FormatOptions) {
        let callbacks: Vec<SubscriberFn> = {
            let subscribers = self.subscribers.lock();
            subscribers.iter().map(|sub| Arc::clone(&sub.callback)).collect()
        };
        for callback in callbacks {
            callback(snapshot);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
