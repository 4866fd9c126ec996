//! `[log]` section
//!
//! `level` is handed to `tracing_subscriber::EnvFilter` as-is, so besides a
//! bare level it accepts per-crate directives such as
//! `"info,relay_pipeline=debug"` to watch pacing without the dispatch noise.

use serde::Deserialize;

/// Filter used when neither the CLI nor the config names one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log line encoding
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Console,
    Json,
}

/// Stream the subscriber writes to
///
/// Defaults to stderr: `check` and `channels` print their results on stdout.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
}

/// Logging configuration
///
/// ```toml
/// [log]
/// level = "info,relay_pipeline=debug"
/// format = "json"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
            output: LogOutput::default(),
        }
    }
}

impl LogConfig {
    /// Filter directive to run with: a non-blank CLI value wins over the file
    pub fn filter<'a>(&'a self, cli_level: Option<&'a str>) -> &'a str {
        cli_level
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| self.level.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_stdout_free() {
        let config: LogConfig = toml::from_str("").unwrap();
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.filter(None), "info");
        assert_eq!(config.output, LogOutput::Stderr);
    }

    #[test]
    fn test_per_crate_directive() {
        let config: LogConfig =
            toml::from_str(r#"level = "warn,relay_pipeline=debug""#).unwrap();
        assert_eq!(config.filter(None), "warn,relay_pipeline=debug");
    }

    #[test]
    fn test_cli_level_overrides_file() {
        let config: LogConfig = toml::from_str(r#"level = "warn""#).unwrap();
        assert_eq!(config.filter(Some("trace")), "trace");
        assert_eq!(config.filter(Some("  ")), "warn");
    }

    #[test]
    fn test_json_on_stdout() {
        let config: LogConfig = toml::from_str(
            r#"
format = "json"
output = "stdout"
"#,
        )
        .unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Stdout);
    }

    #[test]
    fn test_unknown_output_rejected() {
        assert!(toml::from_str::<LogConfig>(r#"output = "file""#).is_err());
    }
}
