//! Bounded FIFO of pending tasks with drop-oldest overflow
//!
//! Producers never wait on capacity: when the queue is full the oldest
//! pending task is evicted to make room for the new one.

use super::task::Task;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Default number of pending tasks kept before the oldest is evicted.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

#[derive(Debug)]
pub struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
    capacity: usize,
}

impl TaskQueue {
    /// Create a queue holding at most `capacity` tasks (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            tasks: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append a task, evicting and returning the oldest one if the queue is full.
    pub fn enqueue(&self, task: Task) -> Option<Task> {
        let mut tasks = self.tasks.lock();
        let evicted = if tasks.len() >= self.capacity {
            tasks.pop_front()
        } else {
            None
        };
        tasks.push_back(task);
        evicted
    }

    /// Remove and return the oldest task, or `None` when empty.
    pub fn dequeue(&self) -> Option<Task> {
        self.tasks.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
