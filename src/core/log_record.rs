//! Rendered log records and logger identities

use super::log_level::LogLevel;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LOGGER_ID: AtomicU64 = AtomicU64::new(1);

/// Routing key tying a record to the file sink of the logger that produced it.
///
/// Identities come from a process-wide monotonically increasing counter, so
/// a removed identity is never handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoggerId(u64);

impl LoggerId {
    /// Allocate a fresh identity.
    pub fn next() -> Self {
        LoggerId(NEXT_LOGGER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A rendered record waiting to be written by a worker.
///
/// The content is produced by the caller; the only change the dispatcher
/// makes is [`LogRecord::finalize_format`], which terminates the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    content: Vec<u8>,
    level: LogLevel,
    sender: LoggerId,
    to_console: bool,
    to_file: bool,
    use_color: bool,
    finalized: bool,
}

impl LogRecord {
    /// A record routed to the console only, without color.
    pub fn new(level: LogLevel, sender: LoggerId, content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            level,
            sender,
            to_console: true,
            to_file: false,
            use_color: false,
            finalized: false,
        }
    }

    #[must_use]
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.to_console = enabled;
        self
    }

    #[must_use]
    pub fn with_file(mut self, enabled: bool) -> Self {
        self.to_file = enabled;
        self
    }

    #[must_use]
    pub fn with_color(mut self, enabled: bool) -> Self {
        self.use_color = enabled;
        self
    }

    /// Terminate the content with a newline. Calling it again has no effect.
    pub fn finalize_format(&mut self) {
        if self.finalized {
            return;
        }
        if self.content.last() != Some(&b'\n') {
            self.content.push(b'\n');
        }
        self.finalized = true;
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn sender(&self) -> LoggerId {
        self.sender
    }

    pub fn to_console(&self) -> bool {
        self.to_console
    }

    pub fn to_file(&self) -> bool {
        self.to_file
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_ids_are_unique_and_increasing() {
        let a = LoggerId::next();
        let b = LoggerId::next();
        assert!(b > a);
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_routing() {
        let record = LogRecord::new(LogLevel::Info, LoggerId::next(), "hello");
        assert!(record.to_console());
        assert!(!record.to_file());
        assert!(!record.use_color());
    }

    #[test]
    fn test_finalize_appends_newline_once() {
        let mut record = LogRecord::new(LogLevel::Warn, LoggerId::next(), "careful");
        record.finalize_format();
        record.finalize_format();
        assert_eq!(record.content(), b"careful\n");
        assert!(record.is_finalized());
    }

    #[test]
    fn test_finalize_keeps_existing_newline() {
        let mut record = LogRecord::new(LogLevel::Warn, LoggerId::next(), "done\n");
        record.finalize_format();
        assert_eq!(record.content(), b"done\n");
    }

    #[test]
    fn test_builder_flags() {
        let record = LogRecord::new(LogLevel::Error, LoggerId::next(), "x")
            .with_console(false)
            .with_file(true)
            .with_color(true);
        assert!(!record.to_console());
        assert!(record.to_file());
        assert!(record.use_color());
        assert_eq!(record.level(), LogLevel::Error);
    }
}
