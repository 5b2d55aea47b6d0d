//! Serialized console sink with optional severity colors

use crate::core::log_level::COLOR_RESET;
use crate::core::{LogLevel, Result};
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};

/// Shared output stream for every worker.
///
/// A single mutex covers the color prefix, the payload, the reset sequence
/// and flushes, so records from different workers never interleave.
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// Console sink over the process's standard output.
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Console sink over an arbitrary writer.
    ///
    /// # Example
    ///
    /// ```
    /// use log_dispatcher::sinks::ConsoleSink;
    /// use log_dispatcher::LogLevel;
    ///
    /// let sink = ConsoleSink::with_writer(Vec::new());
    /// sink.write_record(b"ready\n", None).unwrap();
    /// sink.write_record(b"failed\n", Some(LogLevel::Error)).unwrap();
    /// ```
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
        }
    }

    /// Write one record, wrapped in `color`'s escape sequences when given.
    pub fn write_record(&self, payload: &[u8], color: Option<LogLevel>) -> Result<()> {
        let mut out = self.out.lock();
        match color {
            Some(level) => {
                out.write_all(level.ansi_prefix().as_bytes())?;
                // The reset goes out even if the payload did not.
                let written = out.write_all(payload);
                let reset = out.write_all(COLOR_RESET.as_bytes());
                written?;
                reset?;
            }
            None => out.write_all(payload)?,
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.out.lock().flush()?;
        Ok(())
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink").finish_non_exhaustive()
    }
}
