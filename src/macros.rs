//! Logging macros for ergonomic log message formatting.
//!
//! These macros format their arguments like `format!` and hand the result
//! to an [`AsyncLogger`](crate::AsyncLogger).
//!
//! # Examples
//!
//! ```
//! use log_dispatcher::prelude::*;
//! use log_dispatcher::info;
//! use std::sync::Arc;
//!
//! let pool = Arc::new(
//!     WorkerPool::builder()
//!         .workers(1)
//!         .console(ConsoleSink::with_writer(std::io::sink()))
//!         .build()
//!         .unwrap(),
//! );
//! let logger = AsyncLogger::new(pool, "server");
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use log_dispatcher::prelude::*;
/// # let pool = std::sync::Arc::new(WorkerPool::builder().workers(1)
/// #     .console(ConsoleSink::with_writer(std::io::sink())).build().unwrap());
/// # let logger = AsyncLogger::new(pool, "doc");
/// use log_dispatcher::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
///
/// # Examples
///
/// ```
/// # use log_dispatcher::prelude::*;
/// # let pool = std::sync::Arc::new(WorkerPool::builder().workers(1)
/// #     .console(ConsoleSink::with_writer(std::io::sink())).build().unwrap());
/// # let logger = AsyncLogger::new(pool, "doc");
/// use log_dispatcher::critical;
/// critical!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}
