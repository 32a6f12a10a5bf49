//! # Configuration
//!
//! Finding and reading `log.conf`.
//!
//! - [`discovery`]: the three candidate directories and the first-match search
//! - [`file`]: the `[loggers]` / `[handlers]` / `[formatters]` file layout
//!
//! The configuration shipped with logga is compiled in as [`BUNDLED_CONFIG`]
//! and used when no candidate directory holds a `log.conf`.

pub mod discovery;
pub mod file;

use serde::Deserialize;

pub use discovery::{CONFIG_ENV, CONFIG_FILE_NAME, CandidateLocations};
pub use file::{FormatterSpec, HandlerSpec, HandlerTarget, LoggerSpec, LoggingConfig, ROOT_LOGGER};

/// Fallback configuration, packaged with the crate
pub const BUNDLED_CONFIG: &str = include_str!("../../config/log.conf");

/// Standard stream written by a stream handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamTarget
{
    /// Standard error (default)
    #[default]
    Stderr,
    /// Standard output
    Stdout,
}

/// How a file handler opens its file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum FileMode
{
    /// Keep existing content (`mode = "a"`)
    #[default]
    #[serde(rename = "a")]
    Append,
    /// Empty the file on open (`mode = "w"`)
    #[serde(rename = "w")]
    Truncate,
}

/// Rotation schedule of a rolling file handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation
{
    /// New file every minute
    Minutely,
    /// New file every hour
    Hourly,
    /// New file every day (default)
    #[default]
    Daily,
    /// Never rotate
    Never,
}

impl From<Rotation> for tracing_appender::rolling::Rotation
{
    fn from(rotation: Rotation) -> Self
    {
        match rotation {
            Rotation::Minutely => Self::MINUTELY,
            Rotation::Hourly => Self::HOURLY,
            Rotation::Daily => Self::DAILY,
            Rotation::Never => Self::NEVER,
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_bundled_config_parses()
    {
        let config = LoggingConfig::parse(BUNDLED_CONFIG).unwrap();
        assert!(config.root().is_some());
        assert!(config.loggers.iter().any(|logger| logger.qualname == crate::resolver::FALLBACK_LOGGER_NAME));
    }
}
