//! Basic logger usage example
//!
//! Demonstrates console logging through a worker pool with different log levels.
//!
//! Run with: cargo run --example basic_usage

use log_dispatcher::prelude::*;
use log_dispatcher::{info, warn};
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Log Dispatcher - Basic Usage Example ===\n");

    // Two workers writing to stdout
    let pool = Arc::new(WorkerPool::with_workers(2)?);
    let logger = AsyncLogger::new(Arc::clone(&pool), "basic");
    logger.set_min_level(LogLevel::Trace);

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.critical("This is a critical message");
    logger.flush();

    println!("\n2. Logging with different minimum levels:");
    logger.set_min_level(LogLevel::Info);
    logger.trace("Trace message (hidden)");
    logger.debug("Debug message (hidden)");
    info!(logger, "Info message (visible), pool has {} workers", pool.worker_count());
    warn!(logger, "Warning message (visible)");

    println!("\n3. Plain output:");
    logger.disable_colored_output();
    logger.info("No color codes around this line");

    drop(logger);
    pool.shutdown();

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
