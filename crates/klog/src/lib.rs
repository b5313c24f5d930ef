//! Kernel logging subsystem.
//!
//! Backend for the `log` facade that writes ANSI-coloured level
//! prefixes to COM1. Kernel code logs through the ordinary
//! `log::info!` family; this crate only decides where the bytes go.
#![no_std]

use log::{Level, LevelFilter, Log, Metadata, Record};

/// ANSI colour for a level prefix.
fn color(level: Level) -> &'static str {
    match level {
        Level::Trace => "\x1b[90m", // Gray
        Level::Debug => "\x1b[36m", // Cyan
        Level::Info => "\x1b[32m",  // Green
        Level::Warn => "\x1b[33m",  // Yellow
        Level::Error => "\x1b[31m", // Red
    }
}

struct SerialLogger;

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        khal::serial::write_fmt(format_args!(
            "{}[{:>5}]\x1b[0m {}\n",
            color(record.level()),
            record.level(),
            record.args()
        ));
    }

    fn flush(&self) {}
}

static LOGGER: SerialLogger = SerialLogger;

/// Initialize COM1 and install the serial logger.
///
/// Safe to call exactly once, early in boot. A second call is a no-op
/// (the `log` facade rejects a second logger).
pub fn init(level: LevelFilter) {
    khal::serial::init();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
