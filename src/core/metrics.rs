//! Dispatcher metrics for observability
//!
//! Counters describing what the worker pool did with the tasks it was
//! given: how many were queued, evicted by overflow, dispatched, and where
//! their bytes ended up.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for worker pool observability
///
/// # Example
///
/// ```
/// use log_dispatcher::DispatcherMetrics;
///
/// let metrics = DispatcherMetrics::new();
/// metrics.record_enqueued();
/// metrics.record_dropped();
///
/// assert_eq!(metrics.enqueued(), 1);
/// assert_eq!(metrics.dropped_count(), 1);
/// ```
#[derive(Debug)]
pub struct DispatcherMetrics {
    /// Tasks accepted by the queue
    enqueued: AtomicU64,

    /// Tasks evicted by drop-oldest overflow
    dropped_count: AtomicU64,

    /// Log tasks taken off the queue and dispatched
    processed: AtomicU64,

    /// Records written to the console
    console_writes: AtomicU64,

    /// Records written to a file sink
    file_writes: AtomicU64,

    /// File writes refused by the sink (inactive, too large, exhausted, failed)
    file_writes_skipped: AtomicU64,

    /// Log tasks whose sender had no registered sink
    stale_senders: AtomicU64,

    /// Flush tasks completed
    flushes: AtomicU64,

    /// Tasks whose dispatch panicked
    dispatch_panics: AtomicU64,
}

impl DispatcherMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            console_writes: AtomicU64::new(0),
            file_writes: AtomicU64::new(0),
            file_writes_skipped: AtomicU64::new(0),
            stale_senders: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            dispatch_panics: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn console_writes(&self) -> u64 {
        self.console_writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn file_writes(&self) -> u64 {
        self.file_writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn file_writes_skipped(&self) -> u64 {
        self.file_writes_skipped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn stale_senders(&self) -> u64 {
        self.stale_senders.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dispatch_panics(&self) -> u64 {
        self.dispatch_panics.load(Ordering::Relaxed)
    }

    /// Record an accepted task
    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    /// Record an evicted task; returns the previous drop count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_processed(&self) -> u64 {
        self.processed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_console_write(&self) -> u64 {
        self.console_writes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_file_write(&self) -> u64 {
        self.file_writes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_file_write_skipped(&self) -> u64 {
        self.file_writes_skipped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_stale_sender(&self) -> u64 {
        self.stale_senders.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_flush(&self) -> u64 {
        self.flushes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatch_panic(&self) -> u64 {
        self.dispatch_panics.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of accepted tasks lost to overflow, as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been enqueued.
    pub fn drop_rate(&self) -> f64 {
        let enqueued = self.enqueued() as f64;
        if enqueued == 0.0 {
            0.0
        } else {
            (self.dropped_count() as f64 / enqueued) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.enqueued.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
        self.processed.store(0, Ordering::Relaxed);
        self.console_writes.store(0, Ordering::Relaxed);
        self.file_writes.store(0, Ordering::Relaxed);
        self.file_writes_skipped.store(0, Ordering::Relaxed);
        self.stale_senders.store(0, Ordering::Relaxed);
        self.flushes.store(0, Ordering::Relaxed);
        self.dispatch_panics.store(0, Ordering::Relaxed);
    }
}

impl Default for DispatcherMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DispatcherMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            dropped_count: AtomicU64::new(self.dropped_count()),
            processed: AtomicU64::new(self.processed()),
            console_writes: AtomicU64::new(self.console_writes()),
            file_writes: AtomicU64::new(self.file_writes()),
            file_writes_skipped: AtomicU64::new(self.file_writes_skipped()),
            stale_senders: AtomicU64::new(self.stale_senders()),
            flushes: AtomicU64::new(self.flushes()),
            dispatch_panics: AtomicU64::new(self.dispatch_panics()),
        }
    }
}
