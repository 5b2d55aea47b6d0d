//! File logging example
//!
//! Demonstrates per-logger rotating log files.
//!
//! Run with: cargo run --example file_logging

use log_dispatcher::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Log Dispatcher - File Logging Example ===\n");

    let log_dir = std::env::temp_dir().join("log_dispatcher_demo");
    let pool = Arc::new(WorkerPool::with_workers(2)?);

    let api = AsyncLogger::new(Arc::clone(&pool), "api");
    let db = AsyncLogger::new(Arc::clone(&pool), "db");

    // 512 bytes per file, three files, wrapping around when full
    for logger in [&api, &db] {
        logger.disable_console_logger();
        if !logger.init_file_logger(&log_dir, 512, 3, true) || !logger.enable_file_logger() {
            return Err(DispatchError::file_sink(
                log_dir.display().to_string(),
                "could not open log file",
            ));
        }
    }

    println!("1. Writing enough records to rotate:");
    for i in 0..40 {
        api.info(format!("Handled request #{}", i));
        if i % 4 == 0 {
            db.warn(format!("Query #{} took longer than expected", i));
        }
    }

    println!("2. Renaming a logger changes the next file's name:");
    db.set_tag("database");
    for i in 0..10 {
        db.info(format!("Connection pool check #{}", i));
    }

    api.flush();
    drop(api);
    drop(db);
    pool.shutdown();

    println!("\n=== Example completed successfully! ===");
    println!("Check {} for api-N.log and db-N.log files", log_dir.display());
    Ok(())
}
