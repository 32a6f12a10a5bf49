//! # Configuration Resolution
//!
//! Decides which `log.conf` drives a [`Registry`] and which logger the
//! application should write to.
//!
//! 1. The first readable `log.conf` among the candidate directories is parsed
//! 2. If there is none, the bundled configuration is used
//! 3. The chosen configuration is applied to the registry
//!
//! With an external file, the resolved logger is named after the running
//! program. With the bundled file it is [`FALLBACK_LOGGER_NAME`].

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{BUNDLED_CONFIG, CandidateLocations, LoggingConfig};
use crate::error::{LoggaError, Result};
use crate::registry::Registry;

/// Logger name used with the bundled configuration
pub const FALLBACK_LOGGER_NAME: &str = "logga";

/// Program name reported by an interactive session
pub const INTERACTIVE_MARKER: &str = "<stdin>";

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource
{
    /// A `log.conf` found in one of the candidate directories
    External(PathBuf),
    /// The configuration compiled into logga
    Bundled,
}

/// Outcome of [`Resolver::resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution
{
    /// Active configuration
    pub source: ConfigSource,
    /// Name of the logger to write to, `None` for the root logger
    pub logger_name: Option<String>,
}

impl Resolution
{
    /// Whether the bundled configuration is active.
    #[must_use]
    pub fn is_bundled(&self) -> bool
    {
        self.source == ConfigSource::Bundled
    }
}

/// Inputs of configuration resolution
#[derive(Debug, Clone, Default)]
pub struct Resolver
{
    locations: CandidateLocations,
    program: Option<String>,
}

impl Resolver
{
    /// Resolver over `locations`, with no program name.
    #[must_use]
    pub fn new(locations: CandidateLocations) -> Self
    {
        Self { locations, program: None }
    }

    /// Resolver for the running process.
    ///
    /// Candidates come from `LOGGA_CONF`, the working directory and the home
    /// directory. The program name is the first command-line argument.
    #[must_use]
    pub fn from_env() -> Self
    {
        let program = env::args_os().next().map(|arg| arg.to_string_lossy().into_owned());
        Self {
            locations: CandidateLocations::from_env(),
            program,
        }
    }

    /// Set the program name used to derive the logger name.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self
    {
        self.program = Some(program.into());
        self
    }

    /// Candidate directories searched by [`Resolver::resolve`].
    #[must_use]
    pub fn locations(&self) -> &CandidateLocations
    {
        &self.locations
    }

    /// Program name, if known.
    #[must_use]
    pub fn program(&self) -> Option<&str>
    {
        self.program.as_deref()
    }

    /// Pick a configuration, apply it to `registry` and derive the logger name.
    ///
    /// ## Errors
    ///
    /// - [`LoggaError::Config`] if a discovered `log.conf` is not UTF-8 or is
    ///   invalid
    /// - [`LoggaError::BundledConfig`] if the bundled configuration is invalid
    /// - [`LoggaError::HandlerInit`] if a configured handler cannot be opened
    pub fn resolve(&self, registry: &Registry) -> Result<Resolution>
    {
        let resolution = match self.locations.find() {
            Some((path, bytes)) => {
                let config = LoggingConfig::parse_bytes(&bytes).map_err(|source| LoggaError::Config {
                    path: path.clone(),
                    source,
                })?;
                registry.apply(&config)?;
                Resolution {
                    logger_name: self.program.as_deref().and_then(derive_logger_name),
                    source: ConfigSource::External(path),
                }
            }
            None => {
                debug!("no log.conf found, using bundled configuration");
                let config = LoggingConfig::parse(BUNDLED_CONFIG).map_err(LoggaError::BundledConfig)?;
                registry.apply(&config)?;
                Resolution {
                    source: ConfigSource::Bundled,
                    logger_name: Some(FALLBACK_LOGGER_NAME.to_string()),
                }
            }
        };

        match &resolution.source {
            ConfigSource::External(path) => {
                info!(path = %path.display(), logger = ?resolution.logger_name, "logging configured from file");
            }
            ConfigSource::Bundled => info!(logger = FALLBACK_LOGGER_NAME, "logging configured from bundled defaults"),
        }
        Ok(resolution)
    }
}

/// Resolve the process environment's configuration into `registry`.
///
/// Shorthand for `Resolver::from_env().resolve(registry)`.
///
/// ## Errors
///
/// See [`Resolver::resolve`].
pub fn resolve(registry: &Registry) -> Result<Resolution>
{
    Resolver::from_env().resolve(registry)
}

/// Logger name for a program path: its base name, or `None` for an
/// interactive session or an empty name.
#[must_use]
pub fn derive_logger_name(program: &str) -> Option<String>
{
    if program.is_empty() || program == INTERACTIVE_MARKER {
        return None;
    }
    let name = Path::new(program).file_name()?.to_string_lossy().into_owned();
    Some(name)
}
