//! Thin logger front end posting rendered records to a worker pool

use super::{
    error::Result,
    log_level::LogLevel,
    log_record::{LogRecord, LoggerId},
    worker_pool::WorkerPool,
};
use crate::sinks::{RotatingFileSink, SinkState};
use chrono::Local;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A named logger whose records are written by a [`WorkerPool`].
///
/// Every logger owns a file sink registered with the pool under a fresh
/// [`LoggerId`]; the registration is removed when the logger is dropped.
/// Records are rendered as `[HH:MM:SS] [tag] LEVEL: message`.
///
/// # Example
///
/// ```
/// use log_dispatcher::prelude::*;
/// use std::sync::Arc;
///
/// let pool = Arc::new(
///     WorkerPool::builder()
///         .workers(1)
///         .console(ConsoleSink::with_writer(std::io::sink()))
///         .build()
///         .unwrap(),
/// );
/// let logger = AsyncLogger::new(Arc::clone(&pool), "api");
/// logger.info("listening");
/// logger.flush();
/// pool.shutdown();
/// assert_eq!(pool.metrics().console_writes(), 1);
/// ```
pub struct AsyncLogger {
    id: LoggerId,
    pool: Arc<WorkerPool>,
    file: Arc<RotatingFileSink>,
    tag: RwLock<String>,
    min_level: RwLock<LogLevel>,
    log_to_console: AtomicBool,
    log_to_file: AtomicBool,
    use_color: AtomicBool,
}

impl AsyncLogger {
    pub fn new(pool: Arc<WorkerPool>, tag: impl Into<String>) -> Self {
        let id = LoggerId::next();
        let file = Arc::new(RotatingFileSink::new());
        pool.register_sink(id, Arc::clone(&file));

        Self {
            id,
            pool,
            file,
            tag: RwLock::new(tag.into()),
            min_level: RwLock::new(LogLevel::default()),
            log_to_console: AtomicBool::new(true),
            log_to_file: AtomicBool::new(false),
            use_color: AtomicBool::new(true),
        }
    }

    /// Logger bound to the process-wide pool, starting it if needed.
    pub fn with_global_pool(tag: impl Into<String>) -> Result<Self> {
        Ok(Self::new(WorkerPool::global()?, tag))
    }

    pub fn id(&self) -> LoggerId {
        self.id
    }

    pub fn tag(&self) -> String {
        self.tag.read().clone()
    }

    /// Change the rendered tag and the filename stem of the next log file.
    pub fn set_tag(&self, tag: impl Into<String>) {
        let tag = tag.into();
        self.file.set_tag(&tag);
        *self.tag.write() = tag;
    }

    pub fn set_min_level(&self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    pub fn min_level(&self) -> LogLevel {
        *self.min_level.read()
    }

    /// Configure and open this logger's file sink.
    ///
    /// Files are named `<tag>-<index>.log` inside `directory`. Returns
    /// whether the first file could be opened; file logging still has to be
    /// switched on with [`enable_file_logger`](Self::enable_file_logger).
    pub fn init_file_logger(
        &self,
        directory: impl AsRef<Path>,
        bytes_per_file: u64,
        max_files: usize,
        rotate: bool,
    ) -> bool {
        let tag = self.tag();
        self.file.init(directory, &tag, bytes_per_file, max_files, rotate)
    }

    /// Start sending records to the file sink. Fails if the sink is not open.
    pub fn enable_file_logger(&self) -> bool {
        if !self.file.is_ready() {
            self.error("Could not enable the file logger. Did you call init_file_logger?");
            return false;
        }
        self.log_to_file.store(true, Ordering::Relaxed);
        true
    }

    pub fn disable_file_logger(&self) {
        self.log_to_file.store(false, Ordering::Relaxed);
    }

    /// Close the log file. Returns whether a file was open.
    pub fn terminate_file_logger(&self) -> bool {
        self.log_to_file.store(false, Ordering::Relaxed);
        self.file.terminate()
    }

    pub fn file_state(&self) -> SinkState {
        self.file.state()
    }

    pub fn enable_console_logger(&self) {
        self.log_to_console.store(true, Ordering::Relaxed);
    }

    pub fn disable_console_logger(&self) {
        self.log_to_console.store(false, Ordering::Relaxed);
    }

    pub fn enable_colored_output(&self) {
        self.use_color.store(true, Ordering::Relaxed);
    }

    pub fn disable_colored_output(&self) {
        self.use_color.store(false, Ordering::Relaxed);
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if level < self.min_level() {
            return;
        }

        let to_console = self.log_to_console.load(Ordering::Relaxed);
        let to_file = self.log_to_file.load(Ordering::Relaxed);
        if !to_console && !to_file {
            return;
        }

        let record = LogRecord::new(level, self.id, self.render(level, &message.into()))
            .with_console(to_console)
            .with_file(to_file)
            .with_color(self.use_color.load(Ordering::Relaxed));
        self.pool.post(record);
    }

    fn render(&self, level: LogLevel, message: &str) -> String {
        format!(
            "[{}] [{}] {}: {}\n",
            Local::now().format("%H:%M:%S"),
            self.tag.read(),
            level,
            message
        )
    }

    /// Ask the pool to flush the console and file sinks. Returns immediately.
    pub fn flush(&self) {
        self.pool.flush();
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(LogLevel::Critical, message);
    }
}

impl Drop for AsyncLogger {
    fn drop(&mut self) {
        self.pool.unregister_sink(self.id);
    }
}
