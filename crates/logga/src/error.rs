//! # Error Types
//!
//! Errors raised while reading logging configuration and while driving the
//! resolved logger.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use std::path::PathBuf;

use thiserror::Error;

use crate::level::ParseLevelError;

/// A `log.conf` text could not be turned into a logging configuration
///
/// These errors describe the configuration text itself. Where the text came
/// from is attached by [`LoggaError::Config`] or [`LoggaError::BundledConfig`].
#[derive(Error, Debug)]
pub enum ConfigError
{
    /// The file is not UTF-8 text
    #[error("not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// The text is not valid TOML, or a section has the wrong shape
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// `[loggers]` does not list a `root` logger
    #[error("no `root` entry in [loggers] keys")]
    MissingRoot,

    /// A key is listed but its `[logger_*]`, `[handler_*]` or `[formatter_*]`
    /// subsection does not exist
    #[error("missing section [{0}]")]
    MissingSection(String),

    /// A logger refers to a handler key that `[handlers]` does not list
    #[error("logger `{logger}` refers to unknown handler `{handler}`")]
    UnknownHandler
    {
        /// Logger key
        logger: String,
        /// Handler key that could not be found
        handler: String,
    },

    /// A handler refers to a formatter key that `[formatters]` does not list
    #[error("handler `{handler}` refers to unknown formatter `{formatter}`")]
    UnknownFormatter
    {
        /// Handler key
        handler: String,
        /// Formatter key that could not be found
        formatter: String,
    },

    /// A `level` value is not one of the six level names
    #[error(transparent)]
    Level(#[from] ParseLevelError),

    /// A `format` value has an unterminated or unknown `%(field)` placeholder
    #[error("invalid format pattern: {0}")]
    InvalidPattern(String),

    /// A `datefmt` value contains an unknown strftime specifier
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),

    /// A `file` or `rolling_file` handler has no `filename`
    #[error("handler `{0}` needs a filename")]
    MissingFilename(String),
}

/// Error type for logga operations
#[derive(Error, Debug)]
pub enum LoggaError
{
    /// `set_level` was given something other than the six level names
    ///
    /// The logger's level is left untouched when this is returned.
    #[error("Invalid argument: {0}")]
    InvalidLevel(#[from] ParseLevelError),

    /// A discovered `log.conf` was read but could not be applied
    #[error("Invalid logging configuration {}: {source}", path.display())]
    Config
    {
        /// File that failed to parse
        path: PathBuf,
        /// What was wrong with it
        #[source]
        source: ConfigError,
    },

    /// The configuration bundled with logga failed to parse
    ///
    /// This is the last fallback; there is nothing left to try.
    #[error("Bundled logging configuration is broken: {0}")]
    BundledConfig(#[source] ConfigError),

    /// An output handler could not be opened
    #[error("Failed to initialize handler `{handler}`: {source}")]
    HandlerInit
    {
        /// Configuration key, or the file path for a handler built in code
        handler: String,
        /// Underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A process-wide instance was already installed
    #[error("logga is already initialized")]
    AlreadyInitialized,
}

/// Convenience type alias for `Result<T, LoggaError>`
///
/// ```rust
/// use logga::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, LoggaError>;
