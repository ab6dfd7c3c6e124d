// Chunk: docs/chunks/editor_logging - tracing subscriber setup
//!
//! Logging setup.
//!
//! The configured level may be a simple level (`info`, `debug`, ...) or a full
//! `EnvFilter` directive string. If `RUST_LOG` is set it is merged on top of
//! the configured directives. Logs go to stderr so the console front end can
//! keep stdout for prompts.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

fn normalize_level_directives(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return "info".to_owned();
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "trace" => "trace".to_owned(),
        "debug" => "debug".to_owned(),
        "info" => "info".to_owned(),
        "warn" | "warning" => "warn".to_owned(),
        "error" => "error".to_owned(),
        _ => trimmed.to_owned(),
    }
}

fn config_env_filter(config: &LoggingConfig) -> EnvFilter {
    let directives = normalize_level_directives(&config.level);
    EnvFilter::try_new(directives)
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::INFO.into()))
}

/// Builds the effective filter from config plus `RUST_LOG`.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    let env_directives = std::env::var("RUST_LOG")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty());

    match env_directives {
        Some(env_directives) => {
            let combined = format!(
                "{},{env_directives}",
                normalize_level_directives(&config.level)
            );
            EnvFilter::try_new(combined)
                .or_else(|_| EnvFilter::try_new(env_directives))
                .unwrap_or_else(|_| config_env_filter(config))
        }
        None => config_env_filter(config),
    }
}

/// Installs the global subscriber. Returns `false` if one was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_simple_levels() {
        assert_eq!(normalize_level_directives("WARNING"), "warn");
        assert_eq!(normalize_level_directives(" Debug "), "debug");
        assert_eq!(normalize_level_directives(""), "info");
    }

    #[test]
    fn test_normalize_passes_directives_through() {
        assert_eq!(
            normalize_level_directives("shadow_edit=debug,notify=warn"),
            "shadow_edit=debug,notify=warn"
        );
    }

    #[test]
    fn test_invalid_directive_falls_back_to_info() {
        let config = LoggingConfig {
            level: "shadow_edit=loud".to_string(),
            json: false,
        };
        let filter = config_env_filter(&config);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_second_init_reports_false() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config);
        assert!(!init_logging(&config));
    }
}
