//! # Log Dispatcher
//!
//! Asynchronous log-record dispatcher: producers hand rendered records to a
//! bounded queue and return immediately, while a fixed pool of worker
//! threads writes them to a colored console and to per-logger rotating
//! files.
//!
//! ## Features
//!
//! - **Non-blocking producers**: posting never waits; a full queue drops its oldest task
//! - **Worker pool**: fixed number of threads, woken on enqueue
//! - **Serialized console**: records and their color codes are never interleaved
//! - **Rotating files**: per-file byte limit, bounded file count, optional wrap-around

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        AsyncLogger, DispatchError, DispatcherMetrics, LogLevel, LogRecord, LoggerId,
        OverflowCallback, PoolConfig, Result, Task, TaskQueue, WorkerPool, WorkerPoolBuilder,
    };
    pub use crate::sinks::{ConsoleSink, RotatingFileSink, SinkState, WriteOutcome};
}

pub use crate::core::{
    AsyncLogger, DispatchError, DispatcherMetrics, LogLevel, LogRecord, LoggerId,
    OverflowCallback, PoolConfig, Result, SinkRegistry, Task, TaskQueue, WorkerPool,
    WorkerPoolBuilder, DEFAULT_IDLE_INTERVAL, DEFAULT_QUEUE_CAPACITY,
};
pub use crate::sinks::{
    ConsoleSink, RotatingFileSink, SinkState, WriteOutcome, LOG_FILE_EXTENSION,
    WRITE_ACCOUNTING_OVERHEAD,
};
