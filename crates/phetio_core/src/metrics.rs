//! Session counters and logging setup.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Counts state captures, applied entries and remote invocations.
pub struct Metrics {
    states_captured: AtomicU64,
    entries_applied: AtomicU64,
    invocations: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states_captured: AtomicU64::new(0),
            entries_applied: AtomicU64::new(0),
            invocations: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a whole-session state capture.
    pub fn record_capture(&self, instances: usize, duration: Duration) {
        let captures = self.states_captured.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(
            capture = captures,
            instances = instances,
            duration_us = duration.as_micros() as u64,
            "Captured state"
        );
    }

    pub fn record_applied(&self, entries: usize) {
        self.entries_applied
            .fetch_add(entries as u64, Ordering::Relaxed);
    }

    pub fn record_invocation(&self, phetio_id: &str, method: &str) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        self.increment_counter(method);
        tracing::trace!(phetio_id = phetio_id, method = method, "Invoked method");
    }

    pub fn increment_counter(&self, name: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |count| count.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn states_captured(&self) -> u64 {
        self.states_captured.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn entries_applied(&self) -> u64 {
        self.entries_applied.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs a global fmt subscriber. `RUST_LOG` wins over `level` when set;
/// a second call leaves the first subscriber in place.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
