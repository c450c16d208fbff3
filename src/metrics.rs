//! Process-wide error metrics.
//!
//! Constructors and mutators notify a [`MetricsObserver`] on each
//! constructive operation: node created, code attached (with a per-code
//! counter), wrap performed, trace attached, traversal run. The default
//! observer is a lock-light aggregate ([`ErrorMetrics`]) created on first
//! use; applications may install their own observer at startup instead.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{OnceLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Observer notified by the core on each constructive operation.
pub trait MetricsObserver: Send + Sync {
    /// An error node was created.
    fn record_created(&self);
    /// A non-zero code was attached to a node.
    fn record_coded(&self, code: i64);
    /// A node wrapped an inner error.
    fn record_wrapped(&self);
    /// A call-site frame was attached to a node.
    fn record_traced(&self);
    /// A chain traversal was started.
    fn record_traverse(&self);
}

/// Lock-light aggregate of error activity (the default observer).
#[derive(Debug, Default)]
pub struct ErrorMetrics {
    created: AtomicU64,
    coded: AtomicU64,
    wrapped: AtomicU64,
    traced: AtomicU64,
    traverse_ops: AtomicU64,
    last_error_time: AtomicI64,
    code_stats: RwLock<HashMap<i64, u64>>,
}

impl ErrorMetrics {
    /// Creates an aggregate with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an immutable copy of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let code_stats = self
            .code_stats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        MetricsSnapshot {
            created: self.created.load(Ordering::Relaxed),
            coded: self.coded.load(Ordering::Relaxed),
            wrapped: self.wrapped.load(Ordering::Relaxed),
            traced: self.traced.load(Ordering::Relaxed),
            traverse_ops: self.traverse_ops.load(Ordering::Relaxed),
            last_error_time: self.last_error_time.load(Ordering::Relaxed),
            code_stats,
        }
    }

    /// Resets every counter to zero.
    pub fn reset(&self) {
        self.created.store(0, Ordering::Relaxed);
        self.coded.store(0, Ordering::Relaxed);
        self.wrapped.store(0, Ordering::Relaxed);
        self.traced.store(0, Ordering::Relaxed);
        self.traverse_ops.store(0, Ordering::Relaxed);
        self.last_error_time.store(0, Ordering::Relaxed);
        self.code_stats
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl MetricsObserver for ErrorMetrics {
    fn record_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
        self.last_error_time
            .store(chrono::Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    fn record_coded(&self, code: i64) {
        self.coded.fetch_add(1, Ordering::Relaxed);
        let mut stats = self
            .code_stats
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *stats.entry(code).or_insert(0) += 1;
    }

    fn record_wrapped(&self) {
        self.wrapped.fetch_add(1, Ordering::Relaxed);
    }

    fn record_traced(&self) {
        self.traced.fetch_add(1, Ordering::Relaxed);
    }

    fn record_traverse(&self) {
        self.traverse_ops.fetch_add(1, Ordering::Relaxed);
    }
}

/// Immutable snapshot of [`ErrorMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Nodes created.
    pub created: u64,
    /// Non-zero codes attached.
    pub coded: u64,
    /// Wraps performed.
    pub wrapped: u64,
    /// Frames attached.
    pub traced: u64,
    /// Traversals started.
    pub traverse_ops: u64,
    /// Timestamp of the last node creation, epoch milliseconds (0 = never).
    pub last_error_time: i64,
    /// Attach count per code value.
    pub code_stats: HashMap<i64, u64>,
}

static DEFAULT: OnceLock<ErrorMetrics> = OnceLock::new();
static OBSERVER: OnceLock<Box<dyn MetricsObserver>> = OnceLock::new();

/// The process-wide default aggregate.
///
/// This is where constructor notifications land unless a custom observer
/// was installed first.
pub fn metrics() -> &'static ErrorMetrics {
    DEFAULT.get_or_init(ErrorMetrics::new)
}

/// Resets the process-wide default aggregate.
pub fn reset_metrics() {
    metrics().reset();
}

/// Installs a custom process-wide observer. May succeed at most once, and
/// only before the first constructive operation; the rejected observer is
/// handed back on failure.
pub fn install_observer(
    observer: Box<dyn MetricsObserver>,
) -> Result<(), Box<dyn MetricsObserver>> {
    OBSERVER.set(observer)
}

/// The observer the core notifies: the installed one, else the default
/// aggregate.
pub(crate) fn observer() -> &'static dyn MetricsObserver {
    match OBSERVER.get() {
        Some(custom) => &**custom,
        None => metrics(),
    }
}

/// Consumer of periodic metrics reports.
pub trait StatsLogger {
    /// Receives the current snapshot.
    fn log_error_stats(&self, snapshot: &MetricsSnapshot);
}

/// Hands the default aggregate's current snapshot to `logger`.
pub fn log_stats(logger: &dyn StatsLogger) {
    logger.log_error_stats(&metrics().snapshot());
}
