/// `log` backend writing to the serial console.
///
/// Records come out as `[LEVEL] message`. The level is `Debug`, or `Trace`
/// when the kernel was built with `VERBOSE_BUILD` set.
use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::serial_println;

struct SerialLogger;

static LOGGER: SerialLogger = SerialLogger;

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            serial_println!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

pub fn init() -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(if option_env!("VERBOSE_BUILD").is_some() {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    });
    Ok(())
}
