//! Structured logging setup for tulsigen
//!
//! Initializes the `tracing` subscriber used by the CLI. Console output is
//! the default; JSON output is available for machine consumption. `RUST_LOG`
//! takes precedence over the configured level when it is set.
//!
//! # Example
//!
//! ```no_run
//! use tulsigen::util::logging::{self, LoggingConfig};
//!
//! logging::init_logging(LoggingConfig::from_env());
//!
//! tracing::info!(project = "App", "Generating project");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., tulsigen::pipeline) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    /// Include thread ID and name in logs
    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    /// Reads `TULSIGEN_LOG_LEVEL` and `TULSIGEN_LOG_JSON`
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var("TULSIGEN_LOG_LEVEL").ok().as_deref(),
            env::var("TULSIGEN_LOG_JSON").ok().as_deref(),
        )
    }

    fn from_vars(level: Option<&str>, json: Option<&str>) -> Self {
        Self {
            level: level.map_or(Level::INFO, parse_level),
            use_json: json.and_then(|v| v.parse::<bool>().ok()).unwrap_or(false),
            ..Default::default()
        }
    }
}

/// Parses a log level, falling back to `INFO` for unknown input
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    let mut filter = EnvFilter::new("warn");
    if let Ok(directive) = format!("tulsigen={}", level).parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    filter
}

/// Initializes the logging system; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("Debug"), Level::DEBUG);
        assert_eq!(parse_level("INFO"), Level::INFO);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_invalid() {
        assert_eq!(parse_level("invalid"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_config_from_vars() {
        let config = LoggingConfig::from_vars(None, None);
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);

        let config = LoggingConfig::from_vars(Some("debug"), Some("true"));
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.use_json);
        assert!(config.include_target);

        let config = LoggingConfig::from_vars(Some("warn"), Some("yes"));
        assert_eq!(config.level, Level::WARN);
        assert!(!config.use_json);
    }
}
