//! Worker pool configuration

use super::error::{DispatchError, Result};
use super::task_queue::DEFAULT_QUEUE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default wait of an idle worker before it looks at the queue again (1 second)
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_secs(1);

/// Callback invoked when tasks are evicted by queue overflow.
///
/// The parameter is the total count of evicted tasks so far.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Sizing and timing of a [`WorkerPool`](crate::core::WorkerPool).
///
/// # Example
///
/// ```
/// use log_dispatcher::PoolConfig;
///
/// let config = PoolConfig::from_json(r#"{ "worker_count": 2, "queue_capacity": 50 }"#).unwrap();
/// assert_eq!(config.worker_count, 2);
/// assert_eq!(config.queue_capacity, 50);
/// assert_eq!(config.idle_interval_ms, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads
    pub worker_count: usize,
    /// Pending tasks kept before the oldest is evicted
    pub queue_capacity: usize,
    /// Upper bound on how long an idle worker waits before polling again
    pub idle_interval_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            idle_interval_ms: DEFAULT_IDLE_INTERVAL.as_millis() as u64,
        }
    }
}

impl PoolConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PoolConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(DispatchError::config(
                "PoolConfig",
                "worker_count must be at least 1",
            ));
        }
        if self.queue_capacity == 0 {
            return Err(DispatchError::config(
                "PoolConfig",
                "queue_capacity must be at least 1",
            ));
        }
        if self.idle_interval_ms == 0 {
            return Err(DispatchError::config(
                "PoolConfig",
                "idle_interval_ms must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }
}

/// Hardware concurrency hint, falling back to a single worker.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
