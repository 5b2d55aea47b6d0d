//! Async logging example
//!
//! Demonstrates many producer threads sharing one worker pool, and what
//! happens when they outrun it.
//!
//! Run with: cargo run --example async_logging

use log_dispatcher::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Log Dispatcher - Async Logging Example ===\n");

    let pool = Arc::new(
        WorkerPool::builder()
            .workers(2)
            .queue_capacity(64)
            .idle_interval(Duration::from_millis(100))
            .on_overflow(Arc::new(|dropped| {
                eprintln!("   overflow: {} records dropped so far", dropped);
            }))
            .build()?,
    );

    println!("1. Multi-threaded logging:");
    let handles: Vec<_> = (0..5)
        .map(|thread_id| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let logger = AsyncLogger::new(pool, format!("thread-{}", thread_id));
                for i in 0..20 {
                    logger.info(format!("Message {}", i));
                    thread::sleep(Duration::from_millis(5));
                }
            })
        })
        .collect();
    for handle in handles {
        if handle.join().is_err() {
            return Err(DispatchError::other("producer thread panicked"));
        }
    }

    println!("\n2. Flooding a small queue:");
    let logger = AsyncLogger::new(Arc::clone(&pool), "flood");
    logger.disable_colored_output();
    for i in 0..5_000 {
        logger.debug(format!("Flood message {}", i));
    }
    drop(logger);
    pool.shutdown();

    let metrics = pool.metrics();
    println!("\n=== Metrics ===");
    println!("   enqueued:  {}", metrics.enqueued());
    println!("   processed: {}", metrics.processed());
    println!("   dropped:   {} ({:.1}%)", metrics.dropped_count(), metrics.drop_rate());
    Ok(())
}
