//! # `log.conf` Layout
//!
//! A `log.conf` is a TOML document laid out the way rc-style logging
//! configurations usually are: three index sections listing keys, and one
//! subsection per key.
//!
//! ```toml
//! [loggers]
//! keys = "root,app"          # or ["root", "app"]
//!
//! [handlers]
//! keys = ["console", "file"]
//!
//! [formatters]
//! keys = ["simple"]
//!
//! [logger_root]
//! level = "WARNING"
//! handlers = ["console"]
//!
//! [logger_app]
//! level = "DEBUG"
//! handlers = "file"
//! qualname = "app"           # defaults to the key
//! propagate = false          # defaults to true
//!
//! [handler_console]
//! class = "stream"           # stream | file | rolling_file
//! stream = "stdout"          # stderr (default) | stdout
//! formatter = "simple"
//!
//! [handler_file]
//! class = "file"
//! filename = "app.log"
//! mode = "w"                 # a (default) | w
//! level = "INFO"
//!
//! [formatter_simple]
//! format = "%(asctime)s %(name)s [%(levelname)s] %(message)s"
//! datefmt = "%H:%M:%S"
//! ```
//!
//! Values are TOML values, so strings are quoted. Classic INI files with bare
//! values (`keys=root`) or Python handler arguments (`args=(sys.stdout,)`) are
//! not accepted and fail with [`ConfigError::Toml`].
//!
//! `root` must be listed in `[loggers]`. Every listed key needs its
//! subsection, and every handler/formatter reference must point at a listed
//! key. Sections that are not listed are ignored.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{FileMode, Rotation, StreamTarget};
use crate::error::ConfigError;
use crate::format::{self, DEFAULT_FORMAT, Pattern};
use crate::level::Level;

/// Key (and name) of the root logger
pub const ROOT_LOGGER: &str = "root";

/// A comma-separated string or an array of strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum KeyList
{
    Csv(String),
    List(Vec<String>),
}

impl Default for KeyList
{
    fn default() -> Self
    {
        KeyList::List(Vec::new())
    }
}

impl KeyList
{
    fn names(&self) -> Vec<String>
    {
        let names: Vec<&str> = match self {
            KeyList::Csv(csv) => csv.split(',').collect(),
            KeyList::List(list) => list.iter().map(String::as_str).collect(),
        };
        names
            .into_iter()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
struct IndexSection
{
    #[serde(default)]
    keys: KeyList,
}

#[derive(Debug, Deserialize)]
struct RawConfig
{
    loggers: IndexSection,
    #[serde(default)]
    handlers: IndexSection,
    #[serde(default)]
    formatters: IndexSection,
    #[serde(flatten)]
    sections: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggerSection
{
    level: Option<String>,
    #[serde(default)]
    handlers: KeyList,
    propagate: Option<bool>,
    qualname: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum HandlerClass
{
    Stream,
    File,
    RollingFile,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HandlerSection
{
    class: HandlerClass,
    level: Option<String>,
    formatter: Option<String>,
    stream: Option<StreamTarget>,
    filename: Option<PathBuf>,
    mode: Option<FileMode>,
    rotation: Option<Rotation>,
    backup_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FormatterSection
{
    format: Option<String>,
    datefmt: Option<String>,
}

/// A logger entry of a `log.conf`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerSpec
{
    /// Key in `[loggers]`
    pub key: String,
    /// Logger name (`root` for the root logger)
    pub qualname: String,
    /// Logger threshold
    pub level: Level,
    /// Handler keys, in order
    pub handlers: Vec<String>,
    /// Whether records continue to ancestor loggers
    pub propagate: bool,
}

/// Where a handler entry writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerTarget
{
    /// stderr or stdout
    Stream(StreamTarget),
    /// A single file
    File
    {
        /// File path, relative to the working directory if not absolute
        path: PathBuf,
        /// Append or truncate
        mode: FileMode,
    },
    /// A rotated file
    RollingFile
    {
        /// File path, relative to the working directory if not absolute
        path: PathBuf,
        /// Rotation schedule
        rotation: Rotation,
        /// How many rotated files to keep
        max_files: Option<usize>,
    },
}

/// A handler entry of a `log.conf`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSpec
{
    /// Key in `[handlers]`
    pub key: String,
    /// Output target
    pub target: HandlerTarget,
    /// Handler threshold
    pub level: Level,
    /// Formatter key, if any
    pub formatter: Option<String>,
}

/// A formatter entry of a `log.conf`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterSpec
{
    /// Key in `[formatters]`
    pub key: String,
    /// `%(field)s` pattern
    pub format: String,
    /// strftime layout for `%(asctime)s`
    pub datefmt: Option<String>,
}

/// A validated `log.conf`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig
{
    /// Loggers, in `[loggers]` order
    pub loggers: Vec<LoggerSpec>,
    /// Handlers, in `[handlers]` order
    pub handlers: Vec<HandlerSpec>,
    /// Formatters, in `[formatters]` order
    pub formatters: Vec<FormatterSpec>,
}

impl LoggingConfig
{
    /// Parse and validate the text of a `log.conf`.
    ///
    /// ## Errors
    ///
    /// Returns a [`ConfigError`] describing the first problem found.
    pub fn parse(text: &str) -> Result<Self, ConfigError>
    {
        let mut raw: RawConfig = toml::from_str(text)?;

        let formatters = raw
            .formatters
            .keys
            .names()
            .into_iter()
            .map(|key| {
                let section: FormatterSection = take_section(&mut raw.sections, "formatter", &key)?;
                let pattern = section.format.unwrap_or_else(|| DEFAULT_FORMAT.to_string());
                Pattern::parse(&pattern)?;
                if let Some(datefmt) = &section.datefmt {
                    format::validate_date_format(datefmt)?;
                }
                Ok(FormatterSpec { key, format: pattern, datefmt: section.datefmt })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let handlers = raw
            .handlers
            .keys
            .names()
            .into_iter()
            .map(|key| {
                let section: HandlerSection = take_section(&mut raw.sections, "handler", &key)?;
                if let Some(formatter) = &section.formatter {
                    if !formatters.iter().any(|f| &f.key == formatter) {
                        return Err(ConfigError::UnknownFormatter { handler: key, formatter: formatter.clone() });
                    }
                }
                let target = match section.class {
                    HandlerClass::Stream => HandlerTarget::Stream(section.stream.unwrap_or_default()),
                    HandlerClass::File => HandlerTarget::File {
                        path: section.filename.ok_or_else(|| ConfigError::MissingFilename(key.clone()))?,
                        mode: section.mode.unwrap_or_default(),
                    },
                    HandlerClass::RollingFile => HandlerTarget::RollingFile {
                        path: section.filename.ok_or_else(|| ConfigError::MissingFilename(key.clone()))?,
                        rotation: section.rotation.unwrap_or_default(),
                        max_files: section.backup_count,
                    },
                };
                Ok(HandlerSpec {
                    level: parse_level(section.level.as_deref())?,
                    formatter: section.formatter,
                    target,
                    key,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let logger_keys = raw.loggers.keys.names();
        if !logger_keys.iter().any(|key| key == ROOT_LOGGER) {
            return Err(ConfigError::MissingRoot);
        }
        let loggers = logger_keys
            .into_iter()
            .map(|key| {
                let section: LoggerSection = take_section(&mut raw.sections, "logger", &key)?;
                let handler_keys = section.handlers.names();
                if let Some(missing) = handler_keys.iter().find(|h| !handlers.iter().any(|spec| &spec.key == *h)) {
                    return Err(ConfigError::UnknownHandler { logger: key, handler: missing.clone() });
                }
                let qualname = if key == ROOT_LOGGER {
                    ROOT_LOGGER.to_string()
                } else {
                    section.qualname.unwrap_or_else(|| key.clone())
                };
                Ok(LoggerSpec {
                    level: parse_level(section.level.as_deref())?,
                    handlers: handler_keys,
                    propagate: section.propagate.unwrap_or(true),
                    qualname,
                    key,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { loggers, handlers, formatters })
    }

    /// Decode and parse the bytes of a `log.conf`.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Encoding`] if the bytes are not UTF-8, otherwise
    /// the errors of [`LoggingConfig::parse`].
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, ConfigError>
    {
        Self::parse(std::str::from_utf8(bytes)?)
    }

    /// The root logger entry.
    #[must_use]
    pub fn root(&self) -> Option<&LoggerSpec>
    {
        self.loggers.iter().find(|logger| logger.key == ROOT_LOGGER)
    }

    /// Handler entry by key.
    #[must_use]
    pub fn handler(&self, key: &str) -> Option<&HandlerSpec>
    {
        self.handlers.iter().find(|handler| handler.key == key)
    }

    /// Formatter entry by key.
    #[must_use]
    pub fn formatter(&self, key: &str) -> Option<&FormatterSpec>
    {
        self.formatters.iter().find(|formatter| formatter.key == key)
    }
}

fn take_section<T: DeserializeOwned>(
    sections: &mut BTreeMap<String, toml::Value>,
    prefix: &str,
    key: &str,
) -> Result<T, ConfigError>
{
    let name = format!("{prefix}_{key}");
    let value = sections.remove(&name).ok_or(ConfigError::MissingSection(name))?;
    Ok(value.try_into()?)
}

fn parse_level(level: Option<&str>) -> Result<Level, ConfigError>
{
    Ok(level.map(str::parse::<Level>).transpose()?.unwrap_or_default())
}
