//! Units of deferred work held in the task queue

use super::log_record::LogRecord;

/// One unit of work for the worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Write a record to its console and/or file sink.
    Log(LogRecord),
    /// Flush the console stream.
    Flush,
}

impl Task {
    pub fn is_flush(&self) -> bool {
        matches!(self, Task::Flush)
    }
}

impl From<LogRecord> for Task {
    fn from(record: LogRecord) -> Self {
        Task::Log(record)
    }
}
