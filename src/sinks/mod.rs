//! Output destinations for rendered records

pub mod console;
pub mod rotating_file;

pub use console::ConsoleSink;
pub use rotating_file::{
    RotatingFileSink, SinkState, WriteOutcome, LOG_FILE_EXTENSION, WRITE_ACCOUNTING_OVERHEAD,
};
