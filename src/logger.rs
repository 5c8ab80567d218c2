// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! `log` backend writing to the platform's [`LogSink`], normally the BL31 console.

#[cfg(all(not(test), target_os = "none"))]
use crate::aarch64::park;
use crate::{debug::DEBUG, platform::LogSinkImpl};
use core::fmt::{Arguments, Write};
#[cfg(all(not(test), target_os = "none"))]
use core::panic::PanicInfo;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::{Once, mutex::SpinMutex};

static LOGGER: Once<Logger> = Once::new();

struct Logger {
    sink: LogSinkImpl,
}

impl Log for Logger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        writeln!(self.sink, "{}: {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// Installs the logger, unless another one already has been.
pub fn init(sink: LogSinkImpl) -> Result<(), SetLoggerError> {
    log::set_logger(LOGGER.call_once(|| Logger { sink }))?;
    log::set_max_level(log_level(option_env!("LOG_LEVEL")));
    Ok(())
}

/// Parses a `LOG_LEVEL` such as "warn", falling back to debug logs in debug builds and info logs
/// otherwise. Never above what the `max_log_*` features compile in.
fn log_level(level: Option<&str>) -> LevelFilter {
    let default = if DEBUG {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    level
        .and_then(|level| level.parse().ok())
        .unwrap_or(default)
        .min(log::STATIC_MAX_LEVEL)
}

#[cfg(all(not(test), target_os = "none"))]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    if let Some(logger) = LOGGER.get() {
        writeln!(logger.sink, "PANIC: {info}");
    }
    park()
}

/// Something to which logs can be sent, from any core.
///
/// `write_fmt` takes `&self`, so the implementation does its own locking.
pub trait LogSink {
    /// Writes the given format arguments to the log sink.
    fn write_fmt(&self, args: Arguments);
}

/// A [`LogSink`] which serialises writes to a console, so lines from different cores aren't
/// interleaved.
pub struct LockedWriter<W: Write> {
    writer: SpinMutex<W>,
}

impl<W: Write> LockedWriter<W> {
    pub const fn new(writer: W) -> Self {
        Self {
            writer: SpinMutex::new(writer),
        }
    }
}

impl<W: Write> LogSink for LockedWriter<W> {
    fn write_fmt(&self, args: Arguments) {
        // There is nowhere to report a broken console.
        let _ = self.writer.lock().write_fmt(args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_writer_keeps_lines_together() {
        let writer = LockedWriter::new(String::new());
        writeln!(writer, "{}: {}", "INFO", "first");
        writeln!(writer, "{}: {}", "WARN", "second");
        assert_eq!(*writer.writer.lock(), "INFO: first\nWARN: second\n");
    }

    #[test]
    fn log_level_from_environment() {
        let default = if DEBUG {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
        assert_eq!(log_level(None), default.min(log::STATIC_MAX_LEVEL));
        assert_eq!(log_level(Some("bogus")), default.min(log::STATIC_MAX_LEVEL));
        assert_eq!(log_level(Some("off")), LevelFilter::Off);
        assert_eq!(
            log_level(Some("warn")),
            LevelFilter::Warn.min(log::STATIC_MAX_LEVEL)
        );
    }
}
