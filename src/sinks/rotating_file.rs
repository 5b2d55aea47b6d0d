//! Per-logger rotating file sink
//!
//! Each logger owns one sink writing to `<directory>/<tag>-<index>.log`.
//! A sink holds at most `bytes_per_file` accounted bytes per file and cycles
//! through at most `max_files` files: when the last file is full it either
//! wraps around to file 1 (`rotate`) or stops accepting writes.

use crate::core::error::{DispatchError, Result};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Extension of every file produced by the sink.
pub const LOG_FILE_EXTENSION: &str = "log";

/// Bytes accounted per write on top of the payload length.
///
/// Kept for compatibility with existing size budgets; it looks like an
/// off-by-one artifact rather than a reserved byte, and nothing is written
/// for it.
pub const WRITE_ACCOUNTING_OVERHEAD: u64 = 1;

/// Lifecycle of a [`RotatingFileSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// `init` has not been called yet
    Uninitialized,
    /// A file is open and accepting writes
    Open,
    /// Opening a file failed, or the last file is full and rotation is disabled
    Exhausted,
    /// `terminate` closed the sink
    Terminated,
}

/// What happened to a single [`RotatingFileSink::write`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The sink is not open
    Inactive,
    /// The record alone exceeds `bytes_per_file`
    TooLarge,
    /// The file budget is used up and rotation is disabled, or the next file
    /// could not be opened
    Exhausted,
    /// The OS rejected the bytes
    Failed,
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written)
    }
}

#[derive(Debug)]
struct FileSinkState {
    directory: PathBuf,
    tag: String,
    writer: Option<BufWriter<File>>,
    current_bytes: u64,
    file_index: usize,
    bytes_per_file: u64,
    max_files: usize,
    rotate: bool,
    healthy: bool,
    state: SinkState,
}

impl FileSinkState {
    fn file_path(&self) -> PathBuf {
        self.directory.join(format!(
            "{}-{}.{}",
            self.tag, self.file_index, LOG_FILE_EXTENSION
        ))
    }

    /// Close the current file and open the one for `file_index`.
    fn open_current(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                eprintln!(
                    "[DISPATCHER WARNING] Failed to flush '{}' before switching files: {}",
                    self.file_path().display(),
                    e
                );
            }
        }

        let path = self.file_path();
        match File::create(&path) {
            Ok(file) => {
                self.writer = Some(BufWriter::new(file));
                self.healthy = true;
                self.state = SinkState::Open;
                Ok(())
            }
            Err(e) => {
                self.healthy = false;
                self.state = SinkState::Exhausted;
                Err(DispatchError::file_sink(
                    path.display().to_string(),
                    format!("Failed to open: {}", e),
                ))
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> WriteOutcome {
        if self.state != SinkState::Open {
            return WriteOutcome::Inactive;
        }

        let effective = data.len() as u64 + WRITE_ACCOUNTING_OVERHEAD;
        if self.bytes_per_file > 0 {
            if effective > self.bytes_per_file {
                return WriteOutcome::TooLarge;
            }

            if self.current_bytes + effective > self.bytes_per_file {
                if self.file_index == self.max_files {
                    if !self.rotate {
                        self.state = SinkState::Exhausted;
                        return WriteOutcome::Exhausted;
                    }
                    self.file_index = 1;
                } else {
                    self.file_index += 1;
                }
                self.current_bytes = 0;

                if let Err(e) = self.open_current() {
                    eprintln!("[DISPATCHER ERROR] Log rotation failed: {}", e);
                    return WriteOutcome::Exhausted;
                }
            }
        }

        let Some(writer) = self.writer.as_mut() else {
            return WriteOutcome::Inactive;
        };
        if let Err(e) = writer.write_all(data) {
            eprintln!(
                "[DISPATCHER ERROR] Failed to write to '{}': {}",
                self.file_path().display(),
                e
            );
            return WriteOutcome::Failed;
        }
        self.current_bytes += effective;
        WriteOutcome::Written
    }
}

/// Rotating file sink owned by one logger.
///
/// All operations take `&self`; the sink serializes them with its own lock,
/// so sinks of different loggers never contend.
///
/// # Example
///
/// ```no_run
/// use log_dispatcher::sinks::{RotatingFileSink, SinkState};
///
/// let sink = RotatingFileSink::new();
/// // Two files of at most 1 MiB each, wrapping around when both are full.
/// if sink.init("/var/log/myapp", "server", 1024 * 1024, 2, true) {
///     sink.write(b"listening on :8080\n");
///     sink.flush();
/// }
/// assert_ne!(sink.state(), SinkState::Uninitialized);
/// ```
#[derive(Debug)]
pub struct RotatingFileSink {
    inner: Mutex<FileSinkState>,
}

impl RotatingFileSink {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FileSinkState {
                directory: PathBuf::new(),
                tag: String::new(),
                writer: None,
                current_bytes: 0,
                file_index: 0,
                bytes_per_file: 0,
                max_files: 0,
                rotate: false,
                healthy: true,
                state: SinkState::Uninitialized,
            }),
        }
    }

    /// Configure the sink and open file 1.
    ///
    /// `bytes_per_file == 0` disables the size limit; `max_files == 0`
    /// disables the file count limit. Returns whether the file could be
    /// opened. Calling `init` again restarts the sink from file 1.
    pub fn init(
        &self,
        directory: impl AsRef<Path>,
        tag: &str,
        bytes_per_file: u64,
        max_files: usize,
        rotate: bool,
    ) -> bool {
        let mut inner = self.inner.lock();
        inner.directory = directory.as_ref().to_path_buf();
        inner.tag = tag.to_string();
        inner.bytes_per_file = bytes_per_file;
        inner.max_files = max_files;
        inner.rotate = rotate;
        inner.current_bytes = 0;
        inner.file_index = 1;

        if let Err(e) = fs::create_dir_all(&inner.directory) {
            let err = DispatchError::io_operation(
                "create log directory",
                format!("Failed to create '{}'", inner.directory.display()),
                e,
            );
            eprintln!("[DISPATCHER ERROR] {}", err);
            inner.writer = None;
            inner.healthy = false;
            inner.state = SinkState::Exhausted;
            return false;
        }

        match inner.open_current() {
            Ok(()) => true,
            Err(e) => {
                eprintln!("[DISPATCHER ERROR] {}", e);
                false
            }
        }
    }

    /// Append `data` to the current file, rotating first when needed.
    pub fn write(&self, data: &[u8]) -> WriteOutcome {
        self.inner.lock().write(data)
    }

    /// Push buffered bytes to the file. No-op when no file is open.
    pub fn flush(&self) {
        let mut inner = self.inner.lock();
        let path = inner.file_path();
        if let Some(writer) = inner.writer.as_mut() {
            let result = writer.flush().and_then(|_| writer.get_ref().sync_data());
            if let Err(e) = result {
                eprintln!(
                    "[DISPATCHER ERROR] Failed to flush '{}': {}",
                    path.display(),
                    e
                );
            }
        }
    }

    /// Close the current file. Returns whether a file was open.
    pub fn terminate(&self) -> bool {
        let mut inner = self.inner.lock();
        let path = inner.file_path();
        let was_open = match inner.writer.take() {
            Some(mut writer) => {
                if let Err(e) = writer.flush() {
                    eprintln!(
                        "[DISPATCHER ERROR] Failed to flush '{}' on terminate: {}",
                        path.display(),
                        e
                    );
                }
                true
            }
            None => false,
        };
        inner.state = SinkState::Terminated;
        was_open
    }

    /// Change the filename stem used the next time a file is opened.
    pub fn set_tag(&self, tag: &str) {
        self.inner.lock().tag = tag.to_string();
    }

    pub fn state(&self) -> SinkState {
        self.inner.lock().state
    }

    /// Whether the last attempt to open a file succeeded.
    pub fn is_healthy(&self) -> bool {
        self.inner.lock().healthy
    }

    /// Whether writes are currently accepted.
    pub fn is_ready(&self) -> bool {
        let inner = self.inner.lock();
        inner.healthy && inner.state == SinkState::Open
    }

    /// Bytes accounted to the current file, including the per-write overhead.
    pub fn current_bytes(&self) -> u64 {
        self.inner.lock().current_bytes
    }

    /// Index of the current file, starting at 1 (0 before `init`).
    pub fn file_index(&self) -> usize {
        self.inner.lock().file_index
    }

    pub fn tag(&self) -> String {
        self.inner.lock().tag.clone()
    }

    /// Path of the current file, if the sink has been initialized.
    pub fn current_path(&self) -> Option<PathBuf> {
        let inner = self.inner.lock();
        (inner.state != SinkState::Uninitialized).then(|| inner.file_path())
    }
}

impl Default for RotatingFileSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if let Some(mut writer) = inner.writer.take() {
            if let Err(e) = writer.flush() {
                eprintln!(
                    "[DISPATCHER ERROR] Failed to flush '{}' on drop: {}",
                    inner.file_path().display(),
                    e
                );
            }
        }
    }
}
