//! Tests for the process-wide worker pool
//!
//! Kept in their own binary: the global pool lives in a static shared by
//! every test in the same process.

use log_dispatcher::prelude::*;
use std::sync::Arc;

#[test]
fn test_global_pool_is_shared_and_drains_on_shutdown() {
    let first = WorkerPool::global().expect("Failed to start global pool");
    let second = WorkerPool::global().expect("Failed to start global pool");
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.is_running());

    let logger = AsyncLogger::with_global_pool("global").expect("Failed to create logger");
    logger.disable_colored_output();
    assert!(first.sink(logger.id()).is_some());
    logger.info("through the global pool");

    WorkerPool::shutdown_global();

    assert!(!first.is_running());
    assert_eq!(first.pending_tasks(), 0);
    assert_eq!(first.metrics().processed(), 1);
    assert_eq!(first.metrics().console_writes(), 1);

    // Later calls hand back the same, stopped pool.
    let third = WorkerPool::global().expect("global pool");
    assert!(Arc::ptr_eq(&first, &third));
    WorkerPool::shutdown_global();
}
