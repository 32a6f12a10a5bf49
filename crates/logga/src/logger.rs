//! # Loggers
//!
//! Named loggers and the records they emit.
//!
//! A [`LoggerHandle`] is a cheap, cloneable reference to a logger living in a
//! [`Registry`]. All handles to the same name share level, handlers and
//! propagation flag, so a change made through one handle is seen by all.
//!
//! ## Emission
//!
//! 1. The registry-wide suppression threshold is checked
//! 2. The logger's own level is checked (`NOTSET` lets everything through)
//! 3. The record goes to the logger's handlers, then to each ancestor's
//!    handlers while `propagate` is set. Ancestors of `app.db` are `app` (if
//!    that logger exists) and finally the root logger.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;

use crate::caller::Caller;
use crate::config::StreamTarget;
use crate::error::Result;
use crate::format::PatternFormat;
use crate::handler::Handler;
use crate::level::Level;
use crate::registry::Registry;

/// Pattern installed by [`LoggerHandle::set_console`]
pub const CONSOLE_FORMAT: &str = "%(asctime)s [%(levelname)s]:: %(message)s";

/// One log event on its way to the handlers
#[derive(Debug)]
pub(crate) struct Record<'a>
{
    pub(crate) logger: &'a str,
    pub(crate) level: Level,
    pub(crate) message: &'a str,
    pub(crate) function: Option<&'a str>,
    pub(crate) file: &'a str,
    pub(crate) line: u32,
    pub(crate) created: i64,
}

macro_rules! emit_at {
    ($level:expr, $record:expr) => {
        tracing::event!(
            target: "logga",
            $level,
            logger = $record.logger,
            levelname = $record.level.name(),
            levelno = $record.level.value(),
            created = $record.created,
            pathname = $record.file,
            lineno = $record.line,
            function = $record.function,
            message = $record.message,
        )
    };
}

impl<'a> Record<'a>
{
    pub(crate) fn new(
        logger: &'a str,
        level: Level,
        message: &'a str,
        function: Option<&'a str>,
        file: &'a str,
        line: u32,
    ) -> Self
    {
        Self {
            logger,
            level,
            message,
            function,
            file,
            line,
            created: Utc::now().timestamp_millis(),
        }
    }

    /// Raise this record as a `tracing` event on the current dispatcher.
    pub(crate) fn emit(&self)
    {
        match self.level {
            Level::NotSet | Level::Debug => emit_at!(tracing::Level::DEBUG, self),
            Level::Info => emit_at!(tracing::Level::INFO, self),
            Level::Warning => emit_at!(tracing::Level::WARN, self),
            Level::Error | Level::Critical => emit_at!(tracing::Level::ERROR, self),
        }
    }
}

/// State shared by every handle to one logger
pub(crate) struct LoggerState
{
    name: String,
    level: AtomicU8,
    propagate: AtomicBool,
    handlers: RwLock<Vec<Arc<Handler>>>,
}

impl LoggerState
{
    pub(crate) fn new(name: impl Into<String>, level: Level) -> Self
    {
        Self {
            name: name.into(),
            level: AtomicU8::new(level.value()),
            propagate: AtomicBool::new(true),
            handlers: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn name(&self) -> &str
    {
        &self.name
    }

    pub(crate) fn level(&self) -> Level
    {
        Level::from_value(self.level.load(Ordering::Acquire))
    }

    pub(crate) fn set_level(&self, level: Level)
    {
        self.level.store(level.value(), Ordering::Release);
    }

    pub(crate) fn propagate(&self) -> bool
    {
        self.propagate.load(Ordering::Acquire)
    }

    pub(crate) fn set_propagate(&self, propagate: bool)
    {
        self.propagate.store(propagate, Ordering::Release);
    }

    pub(crate) fn handlers(&self) -> Vec<Arc<Handler>>
    {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn replace_handlers(&self, handlers: Vec<Arc<Handler>>)
    {
        *self.handlers.write().unwrap_or_else(PoisonError::into_inner) = handlers;
    }

    fn add_handler(&self, handler: Arc<Handler>)
    {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner).push(handler);
    }
}

/// Handle to a named logger
#[derive(Clone)]
pub struct LoggerHandle
{
    state: Arc<LoggerState>,
    registry: Registry,
}

impl fmt::Debug for LoggerHandle
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("LoggerHandle")
            .field("name", &self.name())
            .field("level", &self.level())
            .field("propagate", &self.propagate())
            .field("handlers", &self.state.handlers().len())
            .finish()
    }
}

impl LoggerHandle
{
    pub(crate) fn new(state: Arc<LoggerState>, registry: Registry) -> Self
    {
        Self { state, registry }
    }

    pub(crate) fn state(&self) -> &LoggerState
    {
        &self.state
    }

    /// Logger name (`root` for the root logger).
    #[must_use]
    pub fn name(&self) -> &str
    {
        self.state.name()
    }

    /// Whether this is the registry's root logger.
    #[must_use]
    pub fn is_root(&self) -> bool
    {
        Arc::ptr_eq(&self.state, self.registry.root_state())
    }

    /// The logger's own threshold.
    #[must_use]
    pub fn level(&self) -> Level
    {
        self.state.level()
    }

    /// Set the threshold exactly as given.
    pub fn set_threshold(&self, level: Level)
    {
        self.state.set_level(level);
    }

    /// Set the threshold through the two-step level policy.
    ///
    /// `NOTSET` and `DEBUG` become `DEBUG`; `INFO`, `WARNING`, `ERROR` and
    /// `CRITICAL` all become `INFO` (see [`Level::collapsed`]). Returns the
    /// threshold that was applied.
    ///
    /// ## Errors
    ///
    /// Returns [`LoggaError::InvalidLevel`](crate::LoggaError::InvalidLevel)
    /// for anything but the six level names; the level is left unchanged.
    pub fn set_level(&self, level: &str) -> Result<Level>
    {
        let threshold = level.parse::<Level>()?.collapsed();
        self.state.set_level(threshold);
        Ok(threshold)
    }

    /// Whether a record at `level` would be emitted by this logger.
    ///
    /// Registry-wide suppression takes precedence over the logger's level.
    #[must_use]
    pub fn is_enabled_for(&self, level: Level) -> bool
    {
        !self.registry.is_suppressed(level) && level >= self.level()
    }

    /// Whether records continue to ancestor loggers.
    #[must_use]
    pub fn propagate(&self) -> bool
    {
        self.state.propagate()
    }

    /// Enable or disable propagation to ancestor loggers.
    pub fn set_propagate(&self, propagate: bool)
    {
        self.state.set_propagate(propagate);
    }

    /// Handlers attached to this logger, in order.
    #[must_use]
    pub fn handlers(&self) -> Vec<Arc<Handler>>
    {
        self.state.handlers()
    }

    /// Attach a handler. Returns the shared handle so it can be attached
    /// elsewhere too.
    pub fn add_handler(&self, handler: Handler) -> Arc<Handler>
    {
        let handler = Arc::new(handler);
        self.state.add_handler(Arc::clone(&handler));
        handler
    }

    /// Attach a handler that may already be attached to other loggers.
    pub fn add_shared_handler(&self, handler: Arc<Handler>)
    {
        self.state.add_handler(handler);
    }

    /// Detach every handler.
    pub fn clear_handlers(&self)
    {
        self.state.replace_handlers(Vec::new());
    }

    /// Send output to the console only.
    ///
    /// Drops all handlers, installs one stderr handler using
    /// [`CONSOLE_FORMAT`], turns propagation off and resets the level to
    /// `NOTSET`. Calling it again leaves the same state.
    pub fn set_console(&self)
    {
        let format = PatternFormat::parse(CONSOLE_FORMAT, None).unwrap_or_default();
        let console = Handler::stream(StreamTarget::Stderr, Level::NotSet, format).named("console");
        self.state.replace_handlers(vec![Arc::new(console)]);
        self.state.set_propagate(false);
        self.state.set_level(Level::NotSet);
    }

    /// Log `message` at `level`, attributed to the calling line.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl fmt::Display)
    {
        if !self.is_enabled_for(level) {
            return;
        }
        let location = std::panic::Location::caller();
        self.dispatch(level, &message.to_string(), None, location.file(), location.line());
    }

    /// Log `message` at `level`, attributed to `caller`.
    pub fn log_with_caller(&self, level: Level, message: impl fmt::Display, caller: Caller)
    {
        if !self.is_enabled_for(level) {
            return;
        }
        self.dispatch(level, &message.to_string(), Some(caller.function), caller.file, caller.line);
    }

    /// Log at `DEBUG`.
    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display)
    {
        self.log(Level::Debug, message);
    }

    /// Log at `INFO`.
    #[track_caller]
    pub fn info(&self, message: impl fmt::Display)
    {
        self.log(Level::Info, message);
    }

    /// Log at `WARNING`.
    #[track_caller]
    pub fn warning(&self, message: impl fmt::Display)
    {
        self.log(Level::Warning, message);
    }

    /// Log at `ERROR`.
    #[track_caller]
    pub fn error(&self, message: impl fmt::Display)
    {
        self.log(Level::Error, message);
    }

    /// Log at `CRITICAL`.
    #[track_caller]
    pub fn critical(&self, message: impl fmt::Display)
    {
        self.log(Level::Critical, message);
    }

    /// Log `"<message>: <function> in <file>:<line>"` at `DEBUG`.
    ///
    /// Nothing is formatted unless `DEBUG` is enabled. Use the
    /// [`autolog!`](crate::autolog) macro to fill in `caller`.
    pub fn autolog(&self, message: impl fmt::Display, caller: Caller)
    {
        if !self.is_enabled_for(Level::Debug) {
            return;
        }
        let text = format!("{message}: {} in {}:{}", caller.function, caller.file, caller.line);
        self.dispatch(Level::Debug, &text, Some(caller.function), caller.file, caller.line);
    }

    fn dispatch(&self, level: Level, message: &str, function: Option<&str>, file: &str, line: u32)
    {
        let record = Record::new(self.name(), level, message, function, file, line);

        for handler in self.state.handlers() {
            handler.handle(&record);
        }
        if !self.state.propagate() {
            return;
        }
        for ancestor in self.registry.ancestors(&self.state) {
            for handler in ancestor.handlers() {
                handler.handle(&record);
            }
            if !ancestor.propagate() {
                break;
            }
        }
    }
}
