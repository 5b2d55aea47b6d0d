//! Stress tests for concurrent producers and workers
//!
//! These tests verify:
//! - Records from many producer threads are never spliced on the console
//! - The queue stays bounded while producers outrun the workers
//! - Loggers can come and go while their records are in flight

use log_dispatcher::prelude::*;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Split every write to give other workers a chance to interleave.
        let mid = buf.len() / 2;
        self.0.lock().extend_from_slice(&buf[..mid]);
        thread::yield_now();
        self.0.lock().extend_from_slice(&buf[mid..]);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Records from concurrent producers must each appear as one contiguous run
#[test]
fn test_concurrent_posts_are_not_spliced() {
    let capture = Capture::default();
    let pool = Arc::new(
        WorkerPool::builder()
            .workers(4)
            .queue_capacity(10_000)
            .idle_interval(Duration::from_millis(5))
            .console(ConsoleSink::with_writer(capture.clone()))
            .build()
            .expect("Failed to start worker pool"),
    );

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let id = LoggerId::next();
                for i in 0..200 {
                    let level = LogLevel::ALL[i % LogLevel::ALL.len()];
                    let record = LogRecord::new(level, id, format!("<t{:02}-r{:03}>", t, i))
                        .with_color(i % 2 == 0);
                    pool.post(record);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer panicked");
    }
    pool.shutdown();

    let output = String::from_utf8(capture.0.lock().clone()).unwrap();
    let mut seen = HashSet::new();
    for line in output.lines() {
        // Strip an optional color prefix and the reset that precedes the next record.
        let line = line.trim_start_matches("\x1b[0m");
        if line.is_empty() {
            continue;
        }
        let start = line.find('<').expect("record start");
        let body = &line[start..];
        assert!(
            body.len() == 10 && body.ends_with('>'),
            "spliced record: {:?}",
            line
        );
        if start > 0 {
            let prefix = &line[..start];
            assert!(
                LogLevel::ALL.iter().any(|l| l.ansi_prefix() == prefix),
                "unexpected prefix {:?}",
                prefix
            );
        }
        assert!(seen.insert(body.to_string()), "duplicate record {}", body);
    }
    assert_eq!(seen.len(), 8 * 200);
}

/// Producers outrunning a slow pool never push the queue past its capacity
#[test]
fn test_queue_stays_bounded_under_load() {
    let pool = Arc::new(
        WorkerPool::builder()
            .workers(1)
            .queue_capacity(32)
            .idle_interval(Duration::from_millis(5))
            .console(ConsoleSink::with_writer(io::sink()))
            .build()
            .expect("Failed to start worker pool"),
    );

    let done = Arc::new(AtomicBool::new(false));
    let watcher = {
        let pool = Arc::clone(&pool);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut max_seen = 0;
            while !done.load(Ordering::Acquire) {
                max_seen = max_seen.max(pool.pending_tasks());
            }
            max_seen
        })
    };

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let id = LoggerId::next();
                for i in 0..5_000 {
                    pool.post(LogRecord::new(LogLevel::Trace, id, format!("flood {}", i)));
                    if i % 100 == 0 {
                        pool.flush();
                    }
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("producer panicked");
    }
    done.store(true, Ordering::Release);
    let max_seen = watcher.join().expect("watcher panicked");
    pool.shutdown();

    assert!(max_seen <= 32, "queue grew to {}", max_seen);
    let metrics = pool.metrics();
    assert_eq!(metrics.enqueued(), 4 * (5_000 + 50));
    assert_eq!(
        metrics.processed() + metrics.flushes() + metrics.dropped_count(),
        metrics.enqueued()
    );
}

/// Loggers created and dropped while records are in flight never fault a worker
#[test]
fn test_logger_churn_with_in_flight_records() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let pool = Arc::new(
        WorkerPool::builder()
            .workers(4)
            .queue_capacity(1_000)
            .idle_interval(Duration::from_millis(5))
            .console(ConsoleSink::with_writer(io::sink()))
            .build()
            .expect("Failed to start worker pool"),
    );

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let pool = Arc::clone(&pool);
            let dir = temp_dir.path().to_path_buf();
            thread::spawn(move || {
                for round in 0..25 {
                    let logger = AsyncLogger::new(Arc::clone(&pool), format!("churn{}_{}", t, round));
                    logger.disable_console_logger();
                    assert!(logger.init_file_logger(&dir, 4096, 2, true));
                    assert!(logger.enable_file_logger());
                    for i in 0..10 {
                        logger.info(format!("round {} message {}", round, i));
                    }
                    // Dropped with records still queued.
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer panicked");
    }
    pool.shutdown();

    let metrics = pool.metrics();
    assert_eq!(metrics.dispatch_panics(), 0);
    assert_eq!(metrics.processed(), 4 * 25 * 10);
    assert_eq!(
        metrics.file_writes() + metrics.stale_senders() + metrics.file_writes_skipped(),
        metrics.processed()
    );
}
