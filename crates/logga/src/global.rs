//! Process-wide [`Logga`] instance.
//!
//! Libraries should take a [`Logga`] or [`LoggerHandle`](crate::LoggerHandle)
//! from their caller; binaries that want a single shared setup install it
//! here once, early in `main`.

use std::sync::OnceLock;

use crate::context::Logga;
use crate::error::{LoggaError, Result};
use crate::resolver::Resolver;

static GLOBAL: OnceLock<Logga> = OnceLock::new();

/// Resolve the process configuration and install it.
///
/// ## Errors
///
/// Returns [`LoggaError::AlreadyInitialized`] if an instance is installed
/// already, or any error of [`Logga::init`].
pub fn init() -> Result<&'static Logga>
{
    init_with(&Resolver::from_env())
}

/// Resolve with explicit inputs and install the result.
///
/// ## Errors
///
/// Returns [`LoggaError::AlreadyInitialized`] if an instance is installed
/// already, or any error of [`Logga::init_with`].
pub fn init_with(resolver: &Resolver) -> Result<&'static Logga>
{
    if GLOBAL.get().is_some() {
        return Err(LoggaError::AlreadyInitialized);
    }
    let logga = Logga::init_with(resolver)?;
    GLOBAL.set(logga).map_err(|_| LoggaError::AlreadyInitialized)?;
    get().ok_or(LoggaError::AlreadyInitialized)
}

/// The installed instance, if any.
#[must_use]
pub fn get() -> Option<&'static Logga>
{
    GLOBAL.get()
}
