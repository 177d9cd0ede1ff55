//! `log` backend for the browser.
//!
//! Records go to `console.log`, or `console.error` for warnings and errors.
//! Nothing is installed by default, so native tests and host applications can
//! pick their own logger.

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::wasm::{console_error, console_log};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{} {}] {}", record.level(), record.target(), record.args());
        match record.level() {
            Level::Error | Level::Warn => console_error(&line),
            _ => console_log(&line),
        }
    }

    fn flush(&self) {}
}

/// Parse a level name as accepted by `init_logging`; unknown names mean `Info`.
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Info)
}

/// Install the console logger. Calling it again only changes the level.
pub fn init(level: LevelFilter) {
    // A second set_logger fails; the level still applies.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("loud"), LevelFilter::Info);
    }
}
