//! # Logger Registry
//!
//! The set of loggers a [`Logga`](crate::Logga) instance manages, and the
//! switches that apply to all of them at once.
//!
//! - Loggers are created on first use and live as long as the registry
//! - The root logger always exists and is the last stop of propagation
//! - Suppression ([`Registry::suppress_below`]) overrides every logger's level

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::config::{HandlerTarget, LoggingConfig, ROOT_LOGGER};
use crate::error::{LoggaError, Result};
use crate::format::PatternFormat;
use crate::handler::Handler;
use crate::level::Level;
use crate::logger::{LoggerHandle, LoggerState};

struct Shared
{
    root: Arc<LoggerState>,
    loggers: Mutex<HashMap<String, Arc<LoggerState>>>,
    suppressed: AtomicU8,
}

/// Loggers by name, plus the registry-wide suppression threshold
///
/// Cloning gives another handle to the same registry.
#[derive(Clone)]
pub struct Registry
{
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Registry
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Registry")
            .field("loggers", &self.logger_names())
            .field("suppressed", &self.suppressed_level())
            .finish()
    }
}

impl Default for Registry
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl Registry
{
    /// An empty registry: a root logger at `WARNING` with no handlers.
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            shared: Arc::new(Shared {
                root: Arc::new(LoggerState::new(ROOT_LOGGER, Level::Warning)),
                loggers: Mutex::new(HashMap::new()),
                suppressed: AtomicU8::new(Level::NotSet.value()),
            }),
        }
    }

    /// The root logger.
    #[must_use]
    pub fn root(&self) -> LoggerHandle
    {
        LoggerHandle::new(Arc::clone(&self.shared.root), self.clone())
    }

    pub(crate) fn root_state(&self) -> &Arc<LoggerState>
    {
        &self.shared.root
    }

    /// The logger called `name`, created with level `NOTSET` if needed.
    ///
    /// `"root"` is the root logger.
    #[must_use]
    pub fn logger(&self, name: &str) -> LoggerHandle
    {
        if name == ROOT_LOGGER {
            return self.root();
        }
        let state = {
            let mut loggers = self.shared.loggers.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(
                loggers
                    .entry(name.to_string())
                    .or_insert_with(|| Arc::new(LoggerState::new(name, Level::NotSet))),
            )
        };
        LoggerHandle::new(state, self.clone())
    }

    /// Names of all non-root loggers, sorted.
    #[must_use]
    pub fn logger_names(&self) -> Vec<String>
    {
        let loggers = self.shared.loggers.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = loggers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Block every record at or below `level`, whatever the loggers' levels.
    ///
    /// `Level::NotSet` lifts the override.
    pub fn suppress_below(&self, level: Level)
    {
        self.shared.suppressed.store(level.value(), Ordering::Release);
    }

    /// Current override, `Level::NotSet` when none is active.
    #[must_use]
    pub fn suppressed_level(&self) -> Level
    {
        Level::from_value(self.shared.suppressed.load(Ordering::Acquire))
    }

    pub(crate) fn is_suppressed(&self, level: Level) -> bool
    {
        let suppressed = self.suppressed_level();
        suppressed != Level::NotSet && level <= suppressed
    }

    /// Existing ancestors of `logger`, nearest first, ending with the root.
    pub(crate) fn ancestors(&self, logger: &LoggerState) -> Vec<Arc<LoggerState>>
    {
        if std::ptr::eq(logger, Arc::as_ptr(&self.shared.root)) {
            return Vec::new();
        }
        let mut ancestors = {
            let loggers = self.shared.loggers.lock().unwrap_or_else(PoisonError::into_inner);
            let name = logger.name();
            name.match_indices('.')
                .rev()
                .filter_map(|(idx, _)| loggers.get(&name[..idx]).cloned())
                .collect::<Vec<_>>()
        };
        ancestors.push(Arc::clone(&self.shared.root));
        ancestors
    }

    /// Apply a parsed `log.conf`.
    ///
    /// Every handler is opened before any logger changes, so a handler that
    /// fails to open leaves the registry as it was. Each configured logger
    /// then gets the configured level, propagation flag and handlers, replacing
    /// whatever it had. Loggers the configuration does not mention are left
    /// alone.
    ///
    /// ## Errors
    ///
    /// Returns [`LoggaError::HandlerInit`], naming the handler's configuration
    /// key, if a file handler cannot be opened or a formatter built outside
    /// [`LoggingConfig::parse`] is invalid.
    pub fn apply(&self, config: &LoggingConfig) -> Result<()>
    {
        let mut handlers: HashMap<&str, Arc<Handler>> = HashMap::new();
        for spec in &config.handlers {
            let format = match spec.formatter.as_deref().and_then(|key| config.formatter(key)) {
                Some(formatter) => PatternFormat::parse(&formatter.format, formatter.datefmt.as_deref())
                    .map_err(|source| LoggaError::HandlerInit { handler: spec.key.clone(), source: Box::new(source) })?,
                None => PatternFormat::default(),
            };
            let handler = match &spec.target {
                HandlerTarget::Stream(target) => Ok(Handler::stream(*target, spec.level, format)),
                HandlerTarget::File { path, mode } => Handler::file(path, *mode, spec.level, format),
                HandlerTarget::RollingFile { path, rotation, max_files } => {
                    Handler::rolling_file(path, *rotation, *max_files, spec.level, format)
                }
            }
            .map_err(|e| match e {
                LoggaError::HandlerInit { source, .. } => LoggaError::HandlerInit { handler: spec.key.clone(), source },
                other => other,
            })?;
            handlers.insert(spec.key.as_str(), Arc::new(handler.named(&spec.key)));
        }

        for spec in &config.loggers {
            let logger = self.logger(&spec.qualname);
            let attached = spec
                .handlers
                .iter()
                .filter_map(|key| handlers.get(key.as_str()).cloned())
                .collect();
            logger.set_threshold(spec.level);
            logger.set_propagate(spec.propagate);
            logger.state().replace_handlers(attached);
            debug!(logger = %spec.qualname, level = %spec.level, handlers = ?spec.handlers, "configured logger");
        }
        Ok(())
    }

    /// Detach every handler from every logger, closing their outputs.
    pub fn shutdown(&self)
    {
        self.shared.root.replace_handlers(Vec::new());
        let loggers = self.shared.loggers.lock().unwrap_or_else(PoisonError::into_inner);
        for logger in loggers.values() {
            logger.replace_handlers(Vec::new());
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::handler::CaptureBuffer;

    fn capture(logger: &LoggerHandle) -> CaptureBuffer
    {
        let buffer = CaptureBuffer::new();
        logger.add_handler(Handler::capture(&buffer, Level::NotSet, PatternFormat::default()));
        buffer
    }

    #[test]
    fn test_logger_is_shared_by_name()
    {
        let registry = Registry::new();
        registry.logger("app").set_threshold(Level::Error);
        assert_eq!(registry.logger("app").level(), Level::Error);
        assert_eq!(registry.logger_names(), vec!["app".to_string()]);
    }

    #[test]
    fn test_root_by_name()
    {
        let registry = Registry::new();
        assert!(registry.logger("root").is_root());
        assert!(!registry.logger("app").is_root());
        assert_eq!(registry.root().level(), Level::Warning);
    }

    #[test]
    fn test_ancestors_nearest_first()
    {
        let registry = Registry::new();
        let _app = registry.logger("app");
        let _db = registry.logger("app.db");
        let pool = registry.logger("app.db.pool");

        let names: Vec<String> = registry
            .ancestors(pool.state())
            .iter()
            .map(|logger| logger.name().to_string())
            .collect();
        assert_eq!(names, vec!["app.db", "app", "root"]);
    }

    #[test]
    fn test_propagation_reaches_root()
    {
        let registry = Registry::new();
        let root_output = capture(&registry.root());
        let app = registry.logger("app.web");
        let app_output = capture(&app);

        app.warning("slow request");

        assert_eq!(app_output.lines(), vec!["slow request".to_string()]);
        assert_eq!(root_output.lines(), vec!["slow request".to_string()]);
    }

    #[test]
    fn test_propagation_stops_at_flag()
    {
        let registry = Registry::new();
        let root_output = capture(&registry.root());
        let parent = registry.logger("app");
        let parent_output = capture(&parent);
        parent.set_propagate(false);

        registry.logger("app.web").info("handled");

        assert_eq!(parent_output.lines(), vec!["handled".to_string()]);
        assert!(root_output.contents().is_empty());
    }

    #[test]
    fn test_suppression_overrides_levels()
    {
        let registry = Registry::new();
        let app = registry.logger("app");
        let output = capture(&app);
        app.set_propagate(false);

        registry.suppress_below(Level::Error);
        app.error("dropped");
        app.critical("kept");
        registry.suppress_below(Level::NotSet);
        app.debug("back");

        assert_eq!(output.lines(), vec!["kept".to_string(), "back".to_string()]);
    }

    #[test]
    fn test_apply_shares_handlers()
    {
        let registry = Registry::new();
        let config = LoggingConfig::parse(
            r#"
            [loggers]
            keys = ["root", "app"]
            [handlers]
            keys = ["console"]
            [logger_root]
            level = "ERROR"
            handlers = ["console"]
            [logger_app]
            level = "DEBUG"
            handlers = ["console"]
            propagate = false
            [handler_console]
            class = "stream"
            stream = "stdout"
            "#,
        )
        .unwrap();

        registry.apply(&config).unwrap();

        let root = registry.root();
        let app = registry.logger("app");
        assert_eq!(root.level(), Level::Error);
        assert_eq!(app.level(), Level::Debug);
        assert!(!app.propagate());
        assert!(Arc::ptr_eq(&root.handlers()[0], &app.handlers()[0]));
        assert_eq!(app.handlers()[0].name(), Some("console"));
    }

    #[test]
    fn test_apply_reports_handler_key()
    {
        let dir = tempfile::tempdir().unwrap();
        let missing_parent = dir.path().join("not-a-dir");
        std::fs::write(&missing_parent, "").unwrap();
        let config = LoggingConfig {
            loggers: Vec::new(),
            handlers: vec![crate::config::HandlerSpec {
                key: "audit".to_string(),
                target: HandlerTarget::File {
                    path: missing_parent.join("audit.log"),
                    mode: crate::config::FileMode::Truncate,
                },
                level: Level::NotSet,
                formatter: None,
            }],
            formatters: Vec::new(),
        };

        let err = Registry::new().apply(&config).unwrap_err();

        assert!(matches!(err, LoggaError::HandlerInit { ref handler, .. } if handler == "audit"));
    }

    #[test]
    fn test_shutdown_detaches_everything()
    {
        let registry = Registry::new();
        let app = registry.logger("app");
        let output = capture(&app);
        capture(&registry.root());

        registry.shutdown();
        app.critical("after shutdown");

        assert!(app.handlers().is_empty());
        assert!(registry.root().handlers().is_empty());
        assert!(output.contents().is_empty());
    }
}
