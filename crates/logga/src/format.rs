//! # Record Formatting
//!
//! `%(field)s` patterns, rendered through `tracing-subscriber`'s event
//! formatting hook.
//!
//! A logga record reaches a handler as a `tracing` event whose fields carry the
//! logger name, level name, call site and message. [`PatternFormat`] reads those
//! fields back and renders them according to the handler's pattern.
//!
//! ## Supported fields
//!
//! | Placeholder        | Value |
//! |--------------------|-------|
//! | `%(asctime)s`      | Local time, `datefmt` or `%Y-%m-%d %H:%M:%S,%3f` |
//! | `%(created)f`      | Seconds since the Unix epoch |
//! | `%(msecs)d`        | Millisecond part of the timestamp |
//! | `%(name)s`         | Logger name |
//! | `%(levelname)s`    | `DEBUG`, `INFO`, ... |
//! | `%(levelno)s`      | Numeric level |
//! | `%(message)s`      | The message |
//! | `%(pathname)s`     | Source file as compiled |
//! | `%(filename)s`     | File name part of `pathname` |
//! | `%(module)s`       | `filename` without extension |
//! | `%(lineno)d`       | Line number |
//! | `%(funcName)s`     | Function name, when a caller context was given |
//! | `%(process)d`      | Process id |
//! | `%(threadName)s`   | Current thread name |
//!
//! `%%` renders a literal `%`. A placeholder may carry printf-style flags, a
//! width and a precision before its conversion character: `%(levelname)-8s`
//! left-justifies, `%(lineno)4d` right-justifies, `%(message).20s` truncates.

use std::fmt::{self, Write as _};
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::error::ConfigError;

/// Pattern used when a formatter has no `format` key
pub const DEFAULT_FORMAT: &str = "%(message)s";

/// `asctime` layout used when a formatter has no `datefmt` key
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

const UNKNOWN_FILE: &str = "(unknown file)";
const UNKNOWN_FUNCTION: &str = "(unknown function)";

/// Names of the event fields a record is emitted with
pub(crate) mod fields
{
    pub const LOGGER: &str = "logger";
    pub const LEVEL_NAME: &str = "levelname";
    pub const LEVEL_NO: &str = "levelno";
    pub const CREATED: &str = "created";
    pub const PATHNAME: &str = "pathname";
    pub const LINENO: &str = "lineno";
    pub const FUNCTION: &str = "function";
    pub const MESSAGE: &str = "message";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder
{
    AscTime,
    Created,
    Msecs,
    Name,
    LevelName,
    LevelNo,
    Message,
    Pathname,
    Filename,
    Module,
    Lineno,
    FuncName,
    Process,
    ThreadName,
}

impl Placeholder
{
    fn from_name(name: &str) -> Option<Self>
    {
        Some(match name {
            "asctime" => Placeholder::AscTime,
            "created" => Placeholder::Created,
            "msecs" => Placeholder::Msecs,
            "name" => Placeholder::Name,
            "levelname" => Placeholder::LevelName,
            "levelno" => Placeholder::LevelNo,
            "message" => Placeholder::Message,
            "pathname" => Placeholder::Pathname,
            "filename" => Placeholder::Filename,
            "module" => Placeholder::Module,
            "lineno" => Placeholder::Lineno,
            "funcName" => Placeholder::FuncName,
            "process" => Placeholder::Process,
            "threadName" => Placeholder::ThreadName,
            _ => return None,
        })
    }
}

/// printf-style flags, width and precision of one placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Conversion
{
    left: bool,
    zero: bool,
    width: usize,
    precision: Option<usize>,
}

impl Conversion
{
    /// Write `value` padded to the width, truncated to the precision if any.
    fn pad(&self, value: &str, out: &mut impl fmt::Write) -> fmt::Result
    {
        let value = match self.precision {
            Some(precision) => value.char_indices().nth(precision).map_or(value, |(idx, _)| &value[..idx]),
            None => value,
        };
        let width = self.width;
        if self.left {
            write!(out, "{value:<width$}")
        } else if self.zero {
            write!(out, "{value:0>width$}")
        } else {
            write!(out, "{value:>width$}")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment
{
    Literal(String),
    Field(Placeholder, Conversion),
}

/// A parsed `%(field)s` pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern
{
    segments: Vec<Segment>,
}

impl Pattern
{
    /// Parse a pattern.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] for an unterminated `%(`, an
    /// unknown field name, a missing conversion character or a lone `%`.
    pub fn parse(pattern: &str) -> Result<Self, ConfigError>
    {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            match chars.next() {
                Some('%') => literal.push('%'),
                Some('(') => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some(')') => break,
                            Some(ch) => name.push(ch),
                            None => return Err(ConfigError::InvalidPattern(format!("unterminated `%(` in `{pattern}`"))),
                        }
                    }
                    let field = Placeholder::from_name(&name)
                        .ok_or_else(|| ConfigError::InvalidPattern(format!("unknown field `{name}` in `{pattern}`")))?;

                    let mut conversion = Conversion::default();
                    while let Some(flag) = chars.next_if(|ch| matches!(*ch, '-' | '#' | '0' | ' ' | '+')) {
                        match flag {
                            '-' => conversion.left = true,
                            '0' => conversion.zero = true,
                            _ => {}
                        }
                    }
                    conversion.width = take_number(&mut chars).unwrap_or(0);
                    if chars.next_if_eq(&'.').is_some() {
                        conversion.precision = Some(take_number(&mut chars).unwrap_or(0));
                    }
                    // Conversion character (s, d, f, ...) is required. Precision only applies to `s` and `f`.
                    match chars.next() {
                        Some(conv) if conv.is_ascii_alphabetic() => {
                            if !matches!(conv, 's' | 'f') {
                                conversion.precision = None;
                            }
                        }
                        _ => {
                            return Err(ConfigError::InvalidPattern(format!(
                                "missing conversion after `%({name})` in `{pattern}`"
                            )));
                        }
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field, conversion));
                }
                _ => return Err(ConfigError::InvalidPattern(format!("lone `%` in `{pattern}`"))),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    fn uses(&self, placeholder: Placeholder) -> bool
    {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Field(field, _) if *field == placeholder))
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize>
{
    let mut digits = String::new();
    while let Some(digit) = chars.next_if(char::is_ascii_digit) {
        digits.push(digit);
    }
    digits.parse().ok()
}

impl Default for Pattern
{
    fn default() -> Self
    {
        Self { segments: vec![Segment::Field(Placeholder::Message, Conversion::default())] }
    }
}

/// Check a strftime layout before it is used for `asctime`.
///
/// ## Errors
///
/// Returns [`ConfigError::InvalidDateFormat`] when chrono does not understand
/// one of the specifiers.
pub fn validate_date_format(datefmt: &str) -> Result<(), ConfigError>
{
    if StrftimeItems::new(datefmt).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidDateFormat(datefmt.to_string()));
    }
    Ok(())
}

/// Event formatter rendering a [`Pattern`]
#[derive(Debug, Clone, Default)]
pub struct PatternFormat
{
    pattern: Pattern,
    datefmt: Option<String>,
}

impl PatternFormat
{
    /// Formatter for `pattern`, with `asctime` rendered using `datefmt`.
    #[must_use]
    pub fn new(pattern: Pattern, datefmt: Option<String>) -> Self
    {
        Self { pattern, datefmt }
    }

    /// Parse `format` and validate `datefmt`.
    ///
    /// ## Errors
    ///
    /// Returns a [`ConfigError`] if either string is invalid.
    pub fn parse(format: &str, datefmt: Option<&str>) -> Result<Self, ConfigError>
    {
        let pattern = Pattern::parse(format)?;
        if let Some(datefmt) = datefmt {
            validate_date_format(datefmt)?;
        }
        Ok(Self::new(pattern, datefmt.map(str::to_string)))
    }

    /// Render one record into `out`.
    fn render(&self, record: &RecordFields, out: &mut impl fmt::Write) -> fmt::Result
    {
        let created = if self.pattern.uses(Placeholder::AscTime)
            || self.pattern.uses(Placeholder::Msecs)
            || self.pattern.uses(Placeholder::Created)
        {
            Local.timestamp_millis_opt(record.created).single()
        } else {
            None
        };
        let pathname = record.pathname.as_deref().unwrap_or(UNKNOWN_FILE);

        let mut value = String::new();
        for segment in &self.pattern.segments {
            let (field, conversion) = match segment {
                Segment::Literal(text) => {
                    out.write_str(text)?;
                    continue;
                }
                Segment::Field(field, conversion) => (field, conversion),
            };
            value.clear();
            match field {
                Placeholder::AscTime => render_time(created, self.datefmt.as_deref(), &mut value)?,
                Placeholder::Created => {
                    let precision = conversion.precision.unwrap_or(6);
                    write!(value, "{:.precision$}", record.created as f64 / 1000.0)?;
                }
                Placeholder::Msecs => write!(value, "{}", record.created.rem_euclid(1000))?,
                Placeholder::Name => value.push_str(record.logger.as_deref().unwrap_or("root")),
                Placeholder::LevelName => value.push_str(record.levelname.as_deref().unwrap_or("NOTSET")),
                Placeholder::LevelNo => write!(value, "{}", record.levelno)?,
                Placeholder::Message => value.push_str(&record.message),
                Placeholder::Pathname => value.push_str(pathname),
                Placeholder::Filename => value.push_str(file_name(pathname)),
                Placeholder::Module => value.push_str(module_name(pathname)),
                Placeholder::Lineno => write!(value, "{}", record.lineno)?,
                Placeholder::FuncName => value.push_str(record.function.as_deref().unwrap_or(UNKNOWN_FUNCTION)),
                Placeholder::Process => write!(value, "{}", std::process::id())?,
                Placeholder::ThreadName => value.push_str(std::thread::current().name().unwrap_or("<unnamed>")),
            }
            if *field == Placeholder::Created {
                Conversion { precision: None, ..*conversion }.pad(&value, out)?;
            } else {
                conversion.pad(&value, out)?;
            }
        }
        Ok(())
    }
}

fn render_time(created: Option<DateTime<Local>>, datefmt: Option<&str>, out: &mut impl fmt::Write) -> fmt::Result
{
    let Some(created) = created else {
        return Ok(());
    };
    write!(out, "{}", created.format(datefmt.unwrap_or(DEFAULT_DATE_FORMAT)))
}

fn file_name(pathname: &str) -> &str
{
    Path::new(pathname).file_name().and_then(|name| name.to_str()).unwrap_or(pathname)
}

fn module_name(pathname: &str) -> &str
{
    Path::new(pathname).file_stem().and_then(|stem| stem.to_str()).unwrap_or(pathname)
}

impl<S, N> FormatEvent<S, N> for PatternFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, _ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result
    {
        let mut record = RecordFields::default();
        event.record(&mut record);

        let mut line = String::new();
        self.render(&record, &mut line)?;
        writeln!(writer, "{line}")
    }
}

/// Record fields collected back from a `tracing` event
#[derive(Debug, Default)]
struct RecordFields
{
    logger: Option<String>,
    levelname: Option<String>,
    levelno: u64,
    created: i64,
    pathname: Option<String>,
    lineno: u64,
    function: Option<String>,
    message: String,
}

impl Visit for RecordFields
{
    fn record_str(&mut self, field: &Field, value: &str)
    {
        match field.name() {
            fields::LOGGER => self.logger = Some(value.to_string()),
            fields::LEVEL_NAME => self.levelname = Some(value.to_string()),
            fields::PATHNAME => self.pathname = Some(value.to_string()),
            fields::FUNCTION => self.function = Some(value.to_string()),
            fields::MESSAGE => self.message = value.to_string(),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64)
    {
        if field.name() == fields::CREATED {
            self.created = value;
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64)
    {
        match field.name() {
            fields::LEVEL_NO => self.levelno = value,
            fields::LINENO => self.lineno = value,
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug)
    {
        if field.name() == fields::MESSAGE {
            self.message.clear();
            let _ = write!(self.message, "{value:?}");
        }
    }
}
