//! # Caller Context
//!
//! Explicit description of where a log call was made.
//!
//! logga never walks the call stack. Code that wants its function name in a
//! record passes a [`Caller`], usually built by the [`caller!`](crate::caller)
//! macro at the call site:
//!
//! ```rust,no_run
//! use logga::{Logga, autolog};
//!
//! fn load()
//! {
//!     let logga = Logga::init().expect("logging");
//!     autolog!(logga, "loading");
//!     // DEBUG record: "loading: load in src/main.rs:6"
//! }
//! ```

use std::panic::Location;

/// Function, file and line of a log call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller
{
    /// Bare function name (no module path)
    pub function: &'static str,
    /// Source file, as reported by `file!()`
    pub file: &'static str,
    /// Line number, as reported by `line!()`
    pub line: u32,
}

impl Caller
{
    /// Build a caller context from its parts.
    #[must_use]
    pub const fn new(function: &'static str, file: &'static str, line: u32) -> Self
    {
        Self { function, file, line }
    }

    /// Caller context for the location that called this function.
    ///
    /// The function name cannot be recovered from a [`Location`], so it has to
    /// be supplied.
    #[must_use]
    #[track_caller]
    pub fn here(function: &'static str) -> Self
    {
        let location = Location::caller();
        Self::new(function, location.file(), location.line())
    }
}

/// Last path segment of a `type_name` that names a function.
///
/// Closure segments are skipped so that a call inside a closure reports the
/// enclosing function. Used by [`caller!`](crate::caller).
#[doc(hidden)]
#[must_use]
pub fn function_name(path: &'static str) -> &'static str
{
    let path = path.strip_suffix("::__logga_caller").unwrap_or(path);
    path.rsplit("::").find(|segment| *segment != "{{closure}}").unwrap_or(path)
}

/// Capture the [`Caller`] of the current call site.
///
/// ```rust
/// fn handler()
/// {
///     let caller = logga::caller!();
///     assert_eq!(caller.function, "handler");
/// }
/// # handler();
/// ```
#[macro_export]
macro_rules! caller {
    () => {{
        fn __logga_caller() {}
        fn __logga_type_name<T>(_: T) -> &'static str
        {
            ::core::any::type_name::<T>()
        }
        $crate::Caller::new(
            $crate::caller::function_name(__logga_type_name(__logga_caller)),
            file!(),
            line!(),
        )
    }};
}

/// Log `message` with the current call site at DEBUG level.
///
/// `$logga` is anything with an `autolog(message, Caller)` method: a
/// [`Logga`](crate::Logga) or a [`LoggerHandle`](crate::LoggerHandle).
#[macro_export]
macro_rules! autolog {
    ($logga:expr, $message:expr $(,)?) => {
        $logga.autolog($message, $crate::caller!())
    };
}
