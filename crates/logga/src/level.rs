//! # Levels
//!
//! Severity levels understood by logga loggers, handlers and configuration files.
//!
//! logga keeps six levels (`NOTSET` through `CRITICAL`) rather than the five
//! levels of `tracing`. The numeric values leave room between levels and are
//! what loggers compare against: a record passes a threshold when its value is
//! greater than or equal to the threshold's value.

use std::fmt;
use std::str::FromStr;

/// Severity of a log record, or threshold of a logger/handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Level
{
    /// No threshold: every record passes
    #[default]
    NotSet = 0,
    /// Diagnostic detail
    Debug = 10,
    /// Routine information
    Info = 20,
    /// Something unexpected, the program keeps going
    Warning = 30,
    /// An operation failed
    Error = 40,
    /// The program may not be able to continue
    Critical = 50,
}

/// Error returned when a string is not one of the six level names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level `{0}`: use NOTSET, DEBUG, INFO, WARNING, ERROR or CRITICAL")]
pub struct ParseLevelError(pub String);

impl Level
{
    /// Every level, lowest first.
    pub const ALL: [Level; 6] = [
        Level::NotSet,
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    /// Canonical upper-case name, as rendered by `%(levelname)s`.
    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            Level::NotSet => "NOTSET",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Numeric value, as rendered by `%(levelno)d`.
    #[must_use]
    pub const fn value(self) -> u8
    {
        self as u8
    }

    /// Inverse of [`Level::value`]. Values between levels round down.
    #[must_use]
    pub const fn from_value(value: u8) -> Self
    {
        match value {
            0..=9 => Level::NotSet,
            10..=19 => Level::Debug,
            20..=29 => Level::Info,
            30..=39 => Level::Warning,
            40..=49 => Level::Error,
            _ => Level::Critical,
        }
    }

    /// Threshold actually applied by `set_level`.
    ///
    /// Only two thresholds come out of this table: `NOTSET` and `DEBUG` keep
    /// debug output, everything else collapses to `INFO`. Asking for `ERROR`
    /// therefore still lets `INFO` and `WARNING` records through.
    // TODO: pass WARNING/ERROR/CRITICAL through once existing callers stop relying on the INFO floor.
    #[must_use]
    pub const fn collapsed(self) -> Self
    {
        match self {
            Level::NotSet | Level::Debug => Level::Debug,
            Level::Info | Level::Warning | Level::Error | Level::Critical => Level::Info,
        }
    }

    /// The `tracing` level a record of this severity is emitted at.
    ///
    /// `tracing` has no critical level, so `ERROR` and `CRITICAL` share
    /// [`tracing::Level::ERROR`]; the logga level name travels with the event.
    #[must_use]
    pub const fn as_tracing(self) -> tracing::Level
    {
        match self {
            Level::NotSet | Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warning => tracing::Level::WARN,
            Level::Error | Level::Critical => tracing::Level::ERROR,
        }
    }
}

impl From<Level> for tracing::Level
{
    fn from(level: Level) -> Self
    {
        level.as_tracing()
    }
}

impl fmt::Display for Level
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

impl FromStr for Level
{
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.trim().to_uppercase().as_str() {
            "NOTSET" => Ok(Level::NotSet),
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARNING" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "CRITICAL" => Ok(Level::Critical),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
