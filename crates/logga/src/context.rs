//! # Logga Context
//!
//! [`Logga`] owns everything a resolved logging setup consists of: the logger
//! registry, the [`Resolution`] that configured it and the logger the
//! application writes to.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use logga::{Logga, autolog};
//!
//! let logga = Logga::init().expect("Failed to initialize logging");
//! logga.log().info("Application started");
//!
//! logga.set_level("DEBUG").expect("valid level");
//! autolog!(logga, "checkpoint");
//!
//! logga.shutdown();
//! ```

use crate::caller::Caller;
use crate::error::Result;
use crate::level::Level;
use crate::logger::LoggerHandle;
use crate::registry::Registry;
use crate::resolver::{Resolution, Resolver};

/// A resolved logging setup
#[derive(Debug, Clone)]
pub struct Logga
{
    registry: Registry,
    resolution: Resolution,
    log: LoggerHandle,
}

impl Logga
{
    /// Resolve the configuration of the running process.
    ///
    /// ## Errors
    ///
    /// See [`Resolver::resolve`].
    pub fn init() -> Result<Self>
    {
        Self::init_with(&Resolver::from_env())
    }

    /// Resolve with explicit inputs, into a fresh registry.
    ///
    /// When a logger name is derived, that logger becomes the resolved logger
    /// and stops propagating to the root. Otherwise the root logger is used.
    ///
    /// ## Errors
    ///
    /// See [`Resolver::resolve`].
    pub fn init_with(resolver: &Resolver) -> Result<Self>
    {
        let registry = Registry::new();
        let resolution = resolver.resolve(&registry)?;
        let log = match &resolution.logger_name {
            Some(name) => {
                let logger = registry.logger(name);
                logger.set_propagate(false);
                logger
            }
            None => registry.root(),
        };
        Ok(Self { registry, resolution, log })
    }

    /// The resolved logger.
    #[must_use]
    pub fn log(&self) -> &LoggerHandle
    {
        &self.log
    }

    /// The registry holding every logger of this setup.
    #[must_use]
    pub fn registry(&self) -> &Registry
    {
        &self.registry
    }

    /// How the configuration was chosen.
    #[must_use]
    pub fn resolution(&self) -> &Resolution
    {
        &self.resolution
    }

    /// Name of the resolved logger, `None` when it is the root logger.
    #[must_use]
    pub fn logger_name(&self) -> Option<&str>
    {
        self.resolution.logger_name.as_deref()
    }

    /// Route the resolved logger to the console only.
    ///
    /// See [`LoggerHandle::set_console`].
    pub fn set_console(&self)
    {
        self.log.set_console();
    }

    /// Change the resolved logger's threshold.
    ///
    /// See [`LoggerHandle::set_level`] for the accepted names and the
    /// threshold each one maps to.
    ///
    /// ## Errors
    ///
    /// Returns [`LoggaError::InvalidLevel`](crate::LoggaError::InvalidLevel)
    /// for an unknown level name.
    pub fn set_level(&self, level: &str) -> Result<Level>
    {
        self.log.set_level(level)
    }

    /// Silence every logger of the registry below `CRITICAL`.
    pub fn suppress_logging(&self)
    {
        self.registry.suppress_below(Level::Error);
    }

    /// Undo [`Logga::suppress_logging`].
    pub fn enable_logging(&self)
    {
        self.registry.suppress_below(Level::NotSet);
    }

    /// Log `message` at `DEBUG` with the caller's function, file and line.
    ///
    /// Prefer the [`autolog!`](crate::autolog) macro, which fills in `caller`.
    pub fn autolog(&self, message: impl std::fmt::Display, caller: Caller)
    {
        self.log.autolog(message, caller);
    }

    /// Detach and close every handler of every logger.
    ///
    /// Loggers stay usable afterwards but write nowhere until handlers are
    /// added again.
    pub fn shutdown(&self)
    {
        self.registry.shutdown();
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::config::CandidateLocations;
    use crate::resolver::FALLBACK_LOGGER_NAME;

    fn bundled() -> Logga
    {
        Logga::init_with(&Resolver::new(CandidateLocations::default())).unwrap()
    }

    #[test]
    fn test_bundled_resolves_named_logger()
    {
        let logga = bundled();
        assert_eq!(logga.logger_name(), Some(FALLBACK_LOGGER_NAME));
        assert_eq!(logga.log().name(), FALLBACK_LOGGER_NAME);
        assert!(!logga.log().propagate());
        assert_eq!(logga.log().level(), Level::Debug);
    }

    #[test]
    fn test_suppress_and_enable()
    {
        let logga = bundled();
        logga.suppress_logging();
        assert!(!logga.log().is_enabled_for(Level::Error));
        assert!(logga.log().is_enabled_for(Level::Critical));

        logga.enable_logging();
        assert!(logga.log().is_enabled_for(Level::Debug));
    }

    #[test]
    fn test_shutdown_clears_handlers()
    {
        let logga = bundled();
        assert!(!logga.log().handlers().is_empty());
        logga.shutdown();
        assert!(logga.log().handlers().is_empty());
        assert!(logga.registry().root().handlers().is_empty());
    }
}
