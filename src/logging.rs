//! Minimal `log` backend that writes to stderr.
//!
//! The level comes from the `LOG` environment variable (`error`, `warn`, `info`,
//! `debug` or `trace`) and defaults to `warn`, so the shell's own output on stdout
//! stays clean.

use log::{LevelFilter, Log, Metadata, Record};
use std::io::Write;

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = writeln!(
            std::io::stderr().lock(),
            "[{:>5}] {}",
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {}
}

/// Map a `LOG` value to a level filter. Unknown values give `None`.
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Pick the effective level: `LOG` wins, then `verbose`, then `warn`.
pub fn resolve_level(env_value: Option<&str>, verbose: bool) -> LevelFilter {
    match env_value.and_then(parse_level) {
        Some(level) => level,
        None if verbose => LevelFilter::Debug,
        None => LevelFilter::Warn,
    }
}

/// Install the stderr logger. Calling it twice keeps the first logger.
pub fn init(verbose: bool) {
    let env_value = std::env::var("LOG").ok();
    let level = resolve_level(env_value.as_deref(), verbose);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" WARN "), Some(LevelFilter::Warn));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_resolve_level_precedence() {
        assert_eq!(resolve_level(None, false), LevelFilter::Warn);
        assert_eq!(resolve_level(None, true), LevelFilter::Debug);
        assert_eq!(resolve_level(Some("error"), true), LevelFilter::Error);
        assert_eq!(resolve_level(Some("nonsense"), true), LevelFilter::Debug);
    }
}
