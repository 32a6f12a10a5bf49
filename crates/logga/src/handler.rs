//! # Handlers
//!
//! Output sinks attached to loggers.
//!
//! Every handler owns a private `tracing` dispatcher: a
//! `tracing_subscriber::Registry` with a single `fmt` layer that writes through
//! the handler's [`PatternFormat`]. Emitting a record to a handler means
//! raising a `tracing` event while that dispatcher is the thread's default, so
//! handlers never touch the application's global subscriber.
//!
//! Handler kinds:
//! - **Stream**: stderr (default) or stdout
//! - **File**: a single file, appended to or truncated on open
//! - **Rolling file**: a file rotated by `tracing-appender`
//! - **Capture**: an in-memory [`CaptureBuffer`]

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::Dispatch;
use tracing_appender::rolling::{RollingFileAppender, Rotation as AppenderRotation};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use crate::config::{FileMode, Rotation, StreamTarget};
use crate::error::{LoggaError, Result};
use crate::format::PatternFormat;
use crate::level::Level;
use crate::logger::Record;

/// What a handler writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerKind
{
    /// Standard error or standard output
    Stream(StreamTarget),
    /// A plain file
    File(PathBuf),
    /// A file rotated on a schedule
    RollingFile
    {
        /// File name (before the rotation suffix)
        path: PathBuf,
        /// Rotation schedule
        rotation: Rotation,
    },
    /// An in-memory buffer
    Capture,
}

/// An output sink with its own level threshold and format
pub struct Handler
{
    name: Option<String>,
    kind: HandlerKind,
    level: Level,
    dispatch: Dispatch,
}

impl std::fmt::Debug for Handler
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

impl Handler
{
    /// Handler writing to stderr or stdout.
    #[must_use]
    pub fn stream(target: StreamTarget, level: Level, format: PatternFormat) -> Self
    {
        let dispatch = match target {
            StreamTarget::Stderr => dispatch_for(format, io::stderr),
            StreamTarget::Stdout => dispatch_for(format, io::stdout),
        };
        Self { name: None, kind: HandlerKind::Stream(target), level, dispatch }
    }

    /// Handler writing to a single file.
    ///
    /// `FileMode::Truncate` empties the file first; `FileMode::Append` keeps
    /// existing content.
    ///
    /// ## Errors
    ///
    /// Returns [`LoggaError::HandlerInit`] if the file cannot be opened.
    pub fn file(path: impl Into<PathBuf>, mode: FileMode, level: Level, format: PatternFormat) -> Result<Self>
    {
        let path = path.into();
        if mode == FileMode::Truncate {
            File::create(&path).map_err(|e| init_error(&path, e))?;
        }
        let appender = build_appender(&path, AppenderRotation::NEVER, None)?;
        Ok(Self {
            name: None,
            kind: HandlerKind::File(path),
            level,
            dispatch: dispatch_for(format, appender),
        })
    }

    /// Handler writing to a file rotated by `tracing-appender`.
    ///
    /// Rotated files are named `<file name>.<date>`; `max_files` bounds how many
    /// are kept.
    ///
    /// ## Errors
    ///
    /// Returns [`LoggaError::HandlerInit`] if the directory or file cannot be
    /// created.
    pub fn rolling_file(
        path: impl Into<PathBuf>,
        rotation: Rotation,
        max_files: Option<usize>,
        level: Level,
        format: PatternFormat,
    ) -> Result<Self>
    {
        let path = path.into();
        let appender = build_appender(&path, rotation.into(), max_files)?;
        Ok(Self {
            name: None,
            kind: HandlerKind::RollingFile { path, rotation },
            level,
            dispatch: dispatch_for(format, appender),
        })
    }

    /// Handler appending rendered records to `buffer`.
    #[must_use]
    pub fn capture(buffer: &CaptureBuffer, level: Level, format: PatternFormat) -> Self
    {
        let buffer = buffer.clone();
        let dispatch = dispatch_for(format, move || buffer.clone());
        Self { name: None, kind: HandlerKind::Capture, level, dispatch }
    }

    /// Attach the configuration key this handler was built from.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self
    {
        self.name = Some(name.into());
        self
    }

    /// Configuration key, for handlers built from a `log.conf`.
    #[must_use]
    pub fn name(&self) -> Option<&str>
    {
        self.name.as_deref()
    }

    /// What this handler writes to.
    #[must_use]
    pub fn kind(&self) -> &HandlerKind
    {
        &self.kind
    }

    /// Lowest level this handler emits.
    #[must_use]
    pub fn level(&self) -> Level
    {
        self.level
    }

    /// Whether this is a stderr/stdout handler.
    #[must_use]
    pub fn is_stream(&self) -> bool
    {
        matches!(self.kind, HandlerKind::Stream(_))
    }

    /// Emit `record` if it reaches this handler's level.
    pub(crate) fn handle(&self, record: &Record<'_>)
    {
        if record.level < self.level {
            return;
        }
        tracing::dispatcher::with_default(&self.dispatch, || record.emit());
    }
}

fn dispatch_for<W>(format: PatternFormat, writer: W) -> Dispatch
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_ansi(false).with_writer(writer).event_format(format);
    Dispatch::new(Registry::default().with(layer))
}

fn build_appender(path: &Path, rotation: AppenderRotation, max_files: Option<usize>) -> Result<RollingFileAppender>
{
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let Some(file_name) = path.file_name() else {
        return Err(init_error(path, io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")));
    };

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(file_name.to_string_lossy());
    if let Some(max_files) = max_files {
        builder = builder.max_log_files(max_files);
    }
    builder.build(directory).map_err(|e| init_error(path, e))
}

fn init_error(path: &Path, source: impl std::error::Error + Send + Sync + 'static) -> LoggaError
{
    LoggaError::HandlerInit {
        handler: path.display().to_string(),
        source: Box::new(source),
    }
}

/// Shared in-memory sink for [`Handler::capture`]
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer
{
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer
{
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Everything written so far.
    #[must_use]
    pub fn contents(&self) -> String
    {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Written output split into lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String>
    {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Discard everything written so far.
    pub fn clear(&self)
    {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Write for CaptureBuffer
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>
    {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()>
    {
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn record(level: Level, message: &str) -> Record<'_>
    {
        Record::new("app", level, message, None, file!(), line!())
    }

    #[test]
    fn test_capture_handler_renders_pattern()
    {
        let buffer = CaptureBuffer::new();
        let format = PatternFormat::parse("%(name)s|%(levelname)s|%(message)s", None).unwrap();
        let handler = Handler::capture(&buffer, Level::NotSet, format);

        handler.handle(&record(Level::Warning, "disk almost full"));

        assert_eq!(buffer.lines(), vec!["app|WARNING|disk almost full".to_string()]);
    }

    #[test]
    fn test_handler_level_filters_records()
    {
        let buffer = CaptureBuffer::new();
        let handler = Handler::capture(&buffer, Level::Error, PatternFormat::default());

        handler.handle(&record(Level::Info, "ignored"));
        handler.handle(&record(Level::Critical, "kept"));

        assert_eq!(buffer.lines(), vec!["kept".to_string()]);
    }

    #[test]
    fn test_critical_and_error_keep_their_names()
    {
        let buffer = CaptureBuffer::new();
        let format = PatternFormat::parse("%(levelname)s", None).unwrap();
        let handler = Handler::capture(&buffer, Level::NotSet, format);

        handler.handle(&record(Level::Error, "a"));
        handler.handle(&record(Level::Critical, "b"));

        assert_eq!(buffer.lines(), vec!["ERROR".to_string(), "CRITICAL".to_string()]);
    }

    #[test]
    fn test_file_handler_truncate_and_append()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "old\n").unwrap();

        let handler = Handler::file(&path, FileMode::Append, Level::NotSet, PatternFormat::default()).unwrap();
        handler.handle(&record(Level::Info, "appended"));
        drop(handler);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\nappended\n");

        let handler = Handler::file(&path, FileMode::Truncate, Level::NotSet, PatternFormat::default()).unwrap();
        handler.handle(&record(Level::Info, "fresh"));
        drop(handler);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn test_handler_kind()
    {
        let handler = Handler::stream(StreamTarget::Stderr, Level::NotSet, PatternFormat::default());
        assert!(handler.is_stream());
        assert_eq!(handler.kind(), &HandlerKind::Stream(StreamTarget::Stderr));
        assert_eq!(handler.named("console").name(), Some("console"));
    }
}
