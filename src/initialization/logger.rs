//! Logger setup for embedding applications.
//!
//! The library itself only emits through `log`: rejected fields at `debug`,
//! size telemetry at `info`, transport failures at `warn`.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::Colorize;
use log::{Level, LevelFilter};

/// Installs an `env_logger` backend for this crate's records.
///
/// `RUST_LOG` still applies to other targets; `level` wins for
/// `registration_fetcher`. HTTP stack chatter is capped at `info`.
///
/// # Errors
///
/// `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```no_run
/// use registration_fetcher::{init_logger_with, LogFormat};
///
/// init_logger_with(log::LevelFilter::Debug, LogFormat::Json).ok();
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder
        .filter_module("reqwest", LevelFilter::Info)
        .filter_module("hyper", LevelFilter::Info)
        .filter_module("registration_fetcher", level);

    match format {
        LogFormat::Json => builder.format(|buf, record| {
            let line = json_line(
                chrono::Utc::now().timestamp_millis(),
                record.level(),
                record.target(),
                &record.args().to_string(),
            );
            writeln!(buf, "{line}")
        }),
        LogFormat::Plain => builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}: {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                level_label(record.level()),
                record.target(),
                record.args()
            )
        }),
    };

    builder.try_init().map_err(InitializationError::from)
}

/// One structured log record: `{"ts", "level", "target", "msg"}`.
fn json_line(ts_millis: i64, level: Level, target: &str, message: &str) -> String {
    serde_json::json!({
        "ts": ts_millis,
        "level": level.as_str(),
        "target": target,
        "msg": message,
    })
    .to_string()
}

// Problems stand out; routine records stay uncoloured.
fn level_label(level: Level) -> String {
    match level {
        Level::Error => level.as_str().red().bold().to_string(),
        Level::Warn => level.as_str().yellow().to_string(),
        _ => level.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_escapes_message() {
        let line = json_line(1_700_000_000_000, Level::Warn, "registration_fetcher::fetch", r#"bad "header""#);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["ts"], 1_700_000_000_000_i64);
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["target"], "registration_fetcher::fetch");
        assert_eq!(value["msg"], r#"bad "header""#);
    }

    #[test]
    fn test_level_label_plain_for_routine_levels() {
        colored::control::set_override(false);
        assert_eq!(level_label(Level::Info), "INFO");
        assert_eq!(level_label(Level::Debug), "DEBUG");
        assert_eq!(level_label(Level::Error), "ERROR");
        colored::control::unset_override();
    }

    #[test]
    fn test_second_init_is_rejected() {
        let first = init_logger_with(LevelFilter::Debug, LogFormat::Json);
        let second = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        assert!(first.is_ok() || matches!(first, Err(InitializationError::LoggerError(_))));
        assert!(matches!(second, Err(InitializationError::LoggerError(_))));
    }
}
