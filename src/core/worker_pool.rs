//! Background worker pool draining the task queue
//!
//! Producers call [`WorkerPool::post`] and [`WorkerPool::flush`], which only
//! touch the queue and never wait on I/O. A fixed set of worker threads
//! takes one task at a time and performs the console and file writes.

use super::{
    config::{OverflowCallback, PoolConfig},
    error::{DispatchError, Result},
    log_record::{LogRecord, LoggerId},
    metrics::DispatcherMetrics,
    sink_registry::SinkRegistry,
    task::Task,
    task_queue::TaskQueue,
};
use crate::sinks::{ConsoleSink, RotatingFileSink};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

static GLOBAL_POOL: OnceLock<Arc<WorkerPool>> = OnceLock::new();

/// State shared between the pool handle and its workers.
struct Shared {
    queue: TaskQueue,
    console: ConsoleSink,
    registry: SinkRegistry,
    metrics: DispatcherMetrics,
    running: AtomicBool,
    idle_interval: Duration,
    /// Rung after every enqueue so an idle worker can stop waiting early.
    doorbell: Sender<()>,
    wakeups: Receiver<()>,
    on_overflow: Option<OverflowCallback>,
}

impl Shared {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn submit(&self, task: Task) {
        self.metrics.record_enqueued();
        if self.queue.enqueue(task).is_some() {
            self.handle_overflow();
        }
        let _ = self.doorbell.try_send(());
    }

    fn handle_overflow(&self) {
        let dropped_count = self.metrics.record_dropped();

        // Alert on first drop and periodically thereafter
        let should_alert = dropped_count == 0 || (dropped_count + 1) % 1000 == 0;
        if should_alert {
            eprintln!(
                "[DISPATCHER WARNING] Task queue full, {} oldest tasks dropped. \
                 Consider a larger queue capacity or more workers.",
                dropped_count + 1
            );
            if let Some(ref callback) = self.on_overflow {
                callback(dropped_count + 1);
            }
        }
    }

    fn idle(&self) {
        let _ = self.wakeups.recv_timeout(self.idle_interval);
    }

    /// Take one task off the queue and dispatch it. Returns whether a task was found.
    fn do_work(&self) -> bool {
        let Some(task) = self.queue.dequeue() else {
            return false;
        };

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| self.dispatch(task)));
        if let Err(panic_info) = result {
            self.metrics.record_dispatch_panic();
            eprintln!(
                "[DISPATCHER CRITICAL] Task dispatch panicked: {}. Worker continues.",
                panic_message(&*panic_info)
            );
        }
        true
    }

    fn dispatch(&self, task: Task) {
        match task {
            Task::Flush => self.flush_sinks(),
            Task::Log(mut record) => {
                record.finalize_format();
                self.metrics.record_processed();

                if record.to_console() {
                    let color = record.use_color().then(|| record.level());
                    match self.console.write_record(record.content(), color) {
                        Ok(()) => {
                            self.metrics.record_console_write();
                        }
                        Err(e) => eprintln!("[DISPATCHER ERROR] Console write failed: {}", e),
                    }
                }

                if record.to_file() {
                    self.write_to_file(&record);
                }
            }
        }
    }

    fn write_to_file(&self, record: &LogRecord) {
        // The registry lock is released before the write.
        let Some(sink) = self.registry.lookup(record.sender()) else {
            self.metrics.record_stale_sender();
            return;
        };

        if sink.write(record.content()).is_written() {
            self.metrics.record_file_write();
        } else {
            self.metrics.record_file_write_skipped();
        }
    }

    fn flush_sinks(&self) {
        if let Err(e) = self.console.flush() {
            eprintln!("[DISPATCHER ERROR] Console flush failed: {}", e);
        }
        self.metrics.record_flush();

        for sink in self.registry.snapshot() {
            sink.flush();
        }
    }
}

fn run_worker(shared: Arc<Shared>) {
    let mut did_work = shared.do_work();
    while shared.is_running() || did_work {
        if !did_work {
            shared.idle();
        }
        did_work = shared.do_work();
    }
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// A fixed set of worker threads writing records to the console and to
/// per-logger file sinks.
///
/// # Example
///
/// ```
/// use log_dispatcher::prelude::*;
/// use std::time::Duration;
///
/// let pool = WorkerPool::builder()
///     .workers(2)
///     .queue_capacity(100)
///     .idle_interval(Duration::from_millis(50))
///     .console(ConsoleSink::with_writer(Vec::new()))
///     .build()
///     .unwrap();
///
/// let id = LoggerId::next();
/// pool.post(LogRecord::new(LogLevel::Info, id, "service started"));
/// pool.flush();
/// pool.shutdown();
///
/// assert_eq!(pool.metrics().processed(), 1);
/// assert_eq!(pool.metrics().flushes(), 1);
/// ```
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
}

impl WorkerPool {
    /// Start a pool described by `config`, writing to standard output.
    pub fn new(config: PoolConfig) -> Result<Self> {
        WorkerPoolBuilder::new().config(config).build()
    }

    /// Start a pool with `count` workers and default settings otherwise.
    pub fn with_workers(count: usize) -> Result<Self> {
        WorkerPoolBuilder::new().workers(count).build()
    }

    #[must_use]
    pub fn builder() -> WorkerPoolBuilder {
        WorkerPoolBuilder::new()
    }

    /// The lazily started process-wide pool.
    ///
    /// Prefer an explicitly owned pool; the global one exists for callers
    /// that cannot pass a handle around. Statics are not dropped at exit, so
    /// call [`WorkerPool::shutdown_global`] before exiting to drain it.
    pub fn global() -> Result<Arc<WorkerPool>> {
        if let Some(pool) = GLOBAL_POOL.get() {
            return Ok(Arc::clone(pool));
        }
        let pool = Arc::new(WorkerPool::builder().build()?);
        // If another thread won the race our pool is dropped and joined here.
        Ok(Arc::clone(GLOBAL_POOL.get_or_init(|| pool)))
    }

    /// Shut down the global pool if it was ever started.
    pub fn shutdown_global() {
        if let Some(pool) = GLOBAL_POOL.get() {
            pool.shutdown();
        }
    }

    /// Queue a record for writing. Never blocks; may evict the oldest task.
    pub fn post(&self, record: LogRecord) {
        self.shared.submit(Task::Log(record));
    }

    /// Queue a console flush. Never blocks; may evict the oldest task.
    pub fn flush(&self) {
        self.shared.submit(Task::Flush);
    }

    pub fn register_sink(&self, id: LoggerId, sink: Arc<RotatingFileSink>) {
        if self.shared.registry.register(id, sink).is_some() {
            eprintln!("[DISPATCHER WARNING] Replaced the file sink of logger {}", id);
        }
    }

    pub fn unregister_sink(&self, id: LoggerId) -> Option<Arc<RotatingFileSink>> {
        self.shared.registry.unregister(id)
    }

    /// Pass a new filename stem to the sink of `id`. Returns whether `id` is registered.
    pub fn retag(&self, id: LoggerId, tag: &str) -> bool {
        self.shared.registry.retag(id, tag)
    }

    pub fn sink(&self, id: LoggerId) -> Option<Arc<RotatingFileSink>> {
        self.shared.registry.lookup(id)
    }

    pub fn metrics(&self) -> &DispatcherMetrics {
        &self.shared.metrics
    }

    /// Tasks waiting in the queue.
    pub fn pending_tasks(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn queue_capacity(&self) -> usize {
        self.shared.queue.capacity()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Stop the workers and wait for them to exit.
    ///
    /// Each worker keeps draining until it finds the queue empty, so tasks
    /// queued before this call are processed. Tasks posted concurrently with
    /// shutdown may never be. Calling it again does nothing.
    pub fn shutdown(&self) {
        self.shared.running.store(false, Ordering::Release);

        let handles = std::mem::take(&mut *self.workers.lock());
        for _ in 0..handles.len() {
            let _ = self.shared.doorbell.try_send(());
        }
        for handle in handles {
            if let Err(e) = handle.join() {
                eprintln!("[DISPATCHER ERROR] Worker thread panicked during shutdown: {:?}", e);
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();

        let dropped = self.shared.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[DISPATCHER WARNING] Worker pool shutting down with {} dropped tasks (drop rate: {:.2}%)",
                dropped,
                self.shared.metrics.drop_rate()
            );
        }
    }
}

/// Builder for [`WorkerPool`]
///
/// # Example
/// ```
/// use log_dispatcher::prelude::*;
/// use std::sync::Arc;
///
/// let pool = WorkerPool::builder()
///     .workers(1)
///     .queue_capacity(10)
///     .console(ConsoleSink::with_writer(std::io::sink()))
///     .on_overflow(Arc::new(|count| {
///         eprintln!("ALERT: {} tasks dropped", count);
///     }))
///     .build()
///     .unwrap();
/// assert_eq!(pool.queue_capacity(), 10);
/// ```
pub struct WorkerPoolBuilder {
    config: PoolConfig,
    console: Option<ConsoleSink>,
    on_overflow: Option<OverflowCallback>,
}

impl WorkerPoolBuilder {
    pub fn new() -> Self {
        Self {
            config: PoolConfig::default(),
            console: None,
            on_overflow: None,
        }
    }

    /// Replace all sizing and timing settings at once
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn workers(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Longest time an idle worker waits before checking the queue again
    ///
    /// Rounded up to whole milliseconds; a zero interval is rejected by `build`.
    #[must_use = "builder methods return a new value"]
    pub fn idle_interval(mut self, interval: Duration) -> Self {
        let millis = interval.as_nanos().div_ceil(1_000_000);
        self.config.idle_interval_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    /// Write console output somewhere other than standard output
    #[must_use = "builder methods return a new value"]
    pub fn console(mut self, console: ConsoleSink) -> Self {
        self.console = Some(console);
        self
    }

    /// Set a callback for overflow notifications
    ///
    /// Invoked on the first eviction and on every 1000th after that, with
    /// the total number of evicted tasks.
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    /// Validate the configuration and start the workers
    pub fn build(self) -> Result<WorkerPool> {
        self.config.validate()?;

        let worker_count = self.config.worker_count;
        let (doorbell, wakeups) = bounded(worker_count);
        let shared = Arc::new(Shared {
            queue: TaskQueue::new(self.config.queue_capacity),
            console: self.console.unwrap_or_default(),
            registry: SinkRegistry::new(),
            metrics: DispatcherMetrics::new(),
            running: AtomicBool::new(true),
            idle_interval: self.config.idle_interval(),
            doorbell,
            wakeups,
            on_overflow: self.on_overflow,
        });

        // Dropping the pool on a failed spawn joins the workers already started.
        let pool = WorkerPool {
            shared,
            workers: Mutex::new(Vec::with_capacity(worker_count)),
            worker_count,
        };
        for index in 0..worker_count {
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("log-worker-{}", index))
                .spawn(move || run_worker(shared))
                .map_err(|e| DispatchError::worker_spawn(index, e))?;
            pool.workers.lock().push(handle);
        }

        Ok(pool)
    }
}

impl Default for WorkerPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use std::io::{self, Write};
    use std::sync::atomic::{AtomicU64, AtomicUsize};
    use std::time::Instant;
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct Capture {
        bytes: Arc<Mutex<Vec<u8>>>,
        flushes: Arc<AtomicUsize>,
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.bytes.lock().clone()).unwrap()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.bytes.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn pool_with(capture: &Capture, workers: usize) -> WorkerPool {
        WorkerPool::builder()
            .workers(workers)
            .idle_interval(Duration::from_millis(10))
            .console(ConsoleSink::with_writer(capture.clone()))
            .build()
            .unwrap()
    }

    fn wait_for(condition: impl Fn() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(5) {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        assert!(WorkerPool::builder().workers(0).build().is_err());
        assert!(WorkerPool::builder().workers(1).queue_capacity(0).build().is_err());
    }

    #[test]
    fn test_idle_interval_rounds_up_and_rejects_zero() {
        let pool = WorkerPool::builder()
            .workers(1)
            .idle_interval(Duration::from_micros(500))
            .console(ConsoleSink::with_writer(io::sink()))
            .build()
            .unwrap();
        assert_eq!(pool.shared.idle_interval, Duration::from_millis(1));
        pool.shutdown();

        let err = WorkerPool::builder()
            .workers(1)
            .idle_interval(Duration::ZERO)
            .build()
            .err()
            .expect("zero idle interval must be rejected");
        assert!(matches!(err, DispatchError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_console_record_is_written() {
        let capture = Capture::default();
        let pool = pool_with(&capture, 1);

        pool.post(LogRecord::new(LogLevel::Info, LoggerId::next(), "hello"));
        assert!(wait_for(|| pool.metrics().console_writes() == 1));

        assert_eq!(capture.text(), "hello\n");
    }

    #[test]
    fn test_colored_record_is_wrapped() {
        let capture = Capture::default();
        let pool = pool_with(&capture, 1);

        let record = LogRecord::new(LogLevel::Warn, LoggerId::next(), "careful").with_color(true);
        pool.post(record);
        pool.shutdown();

        let expected = format!("{}careful\n\x1b[0m", LogLevel::Warn.ansi_prefix());
        assert_eq!(capture.text(), expected);
    }

    #[test]
    fn test_fifo_order_with_single_worker() {
        let capture = Capture::default();
        let pool = pool_with(&capture, 1);
        let id = LoggerId::next();

        for i in 0..50 {
            pool.post(LogRecord::new(LogLevel::Debug, id, format!("line {}", i)));
        }
        pool.shutdown();

        let expected: String = (0..50).map(|i| format!("line {}\n", i)).collect();
        assert_eq!(capture.text(), expected);
    }

    #[test]
    fn test_flush_task_flushes_console_once_per_call() {
        let capture = Capture::default();
        let pool = pool_with(&capture, 2);

        pool.flush();
        pool.flush();
        pool.flush();
        pool.shutdown();

        assert_eq!(capture.flushes.load(Ordering::SeqCst), 3);
        assert_eq!(pool.metrics().flushes(), 3);
    }

    #[test]
    fn test_file_record_goes_to_registered_sink() {
        let dir = tempdir().unwrap();
        let capture = Capture::default();
        let pool = pool_with(&capture, 1);

        let id = LoggerId::next();
        let sink = Arc::new(RotatingFileSink::new());
        assert!(sink.init(dir.path(), "svc", 0, 1, false));
        pool.register_sink(id, Arc::clone(&sink));

        let record = LogRecord::new(LogLevel::Error, id, "to disk")
            .with_console(false)
            .with_file(true);
        pool.post(record);
        pool.flush();
        pool.shutdown();

        assert_eq!(std::fs::read(dir.path().join("svc-1.log")).unwrap(), b"to disk\n");
        assert!(capture.text().is_empty());
        assert_eq!(pool.metrics().file_writes(), 1);
    }

    #[test]
    fn test_stale_sender_is_skipped() {
        let capture = Capture::default();
        let pool = pool_with(&capture, 1);
        let id = LoggerId::next();
        pool.register_sink(id, Arc::new(RotatingFileSink::new()));
        pool.unregister_sink(id);

        pool.post(LogRecord::new(LogLevel::Info, id, "orphan").with_file(true));
        pool.shutdown();

        assert_eq!(pool.metrics().processed(), 1);
        assert_eq!(pool.metrics().stale_senders(), 1);
        assert_eq!(pool.metrics().file_writes(), 0);
        assert_eq!(pool.metrics().dispatch_panics(), 0);
    }

    #[test]
    fn test_overflow_drops_oldest_and_alerts() {
        let capture = Capture::default();
        let alerts = Arc::new(AtomicU64::new(0));
        let alerts_clone = Arc::clone(&alerts);

        let pool = WorkerPool::builder()
            .workers(1)
            .queue_capacity(5)
            .idle_interval(Duration::from_millis(10))
            .console(ConsoleSink::with_writer(capture.clone()))
            .on_overflow(Arc::new(move |count| {
                alerts_clone.store(count, Ordering::SeqCst);
            }))
            .build()
            .unwrap();
        // Hold the console writer so the only worker stalls on "first"
        // while the queue overflows.
        let blocker = Arc::clone(&capture.bytes);
        let guard = blocker.lock();
        pool.post(LogRecord::new(LogLevel::Info, LoggerId::next(), "first"));
        assert!(wait_for(|| pool.pending_tasks() == 0));

        let id = LoggerId::next();
        for i in 0..8 {
            pool.post(LogRecord::new(LogLevel::Info, id, format!("queued {}", i)));
        }
        assert_eq!(pool.pending_tasks(), 5);
        drop(guard);
        pool.shutdown();

        assert_eq!(pool.metrics().dropped_count(), 3);
        assert_eq!(alerts.load(Ordering::SeqCst), 1);
        let expected: String = std::iter::once("first\n".to_string())
            .chain((3..8).map(|i| format!("queued {}\n", i)))
            .collect();
        assert_eq!(capture.text(), expected);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let capture = Capture::default();
        let pool = pool_with(&capture, 3);
        assert_eq!(pool.worker_count(), 3);
        assert!(pool.is_running());

        pool.shutdown();
        pool.shutdown();
        assert!(!pool.is_running());
    }

    #[test]
    fn test_idle_worker_wakes_on_post() {
        let capture = Capture::default();
        let pool = WorkerPool::builder()
            .workers(1)
            .idle_interval(Duration::from_secs(30))
            .console(ConsoleSink::with_writer(capture.clone()))
            .build()
            .unwrap();
        thread::sleep(Duration::from_millis(20));

        pool.post(LogRecord::new(LogLevel::Info, LoggerId::next(), "wake up"));
        assert!(wait_for(|| pool.metrics().console_writes() == 1));
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(&*boxed), "static message");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(&*boxed), "owned message");
        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*boxed), "Unknown panic");
    }
}
