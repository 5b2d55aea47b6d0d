//! Core dispatcher types: records, tasks, the queue and the worker pool

pub mod config;
pub mod error;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod sink_registry;
pub mod task;
pub mod task_queue;
pub mod worker_pool;

pub use config::{OverflowCallback, PoolConfig, DEFAULT_IDLE_INTERVAL};
pub use error::{DispatchError, Result};
pub use log_level::LogLevel;
pub use log_record::{LogRecord, LoggerId};
pub use logger::AsyncLogger;
pub use metrics::DispatcherMetrics;
pub use sink_registry::SinkRegistry;
pub use task::Task;
pub use task_queue::{TaskQueue, DEFAULT_QUEUE_CAPACITY};
pub use worker_pool::{WorkerPool, WorkerPoolBuilder};
