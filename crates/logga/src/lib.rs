//! # logga
//!
//! Zero-setup logging configuration.
//!
//! logga looks for a `log.conf` in the directory named by `LOGGA_CONF`, then in
//! the current directory, then in the home directory, and applies the first one
//! it finds. Without one it falls back to a bundled default. The result is a
//! ready-to-use logger plus a few helpers: console-only output, a simplified
//! level setter, global suppression and caller-aware debug records.
//!
//! ```rust,no_run
//! use logga::{Logga, autolog};
//!
//! let logga = Logga::init().expect("Failed to initialize logging");
//! logga.log().warning("disk almost full");
//! autolog!(logga, "reached checkpoint");
//! ```
//!
//! Records are rendered by per-handler `tracing` dispatchers, so logga never
//! installs or replaces the application's global subscriber. logga's own
//! diagnostics go to that global subscriber through the usual `tracing`
//! macros.

pub mod caller;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod global;
pub mod handler;
pub mod level;
pub mod logger;
pub mod registry;
pub mod resolver;

pub use caller::Caller;
pub use context::Logga;
pub use error::{ConfigError, LoggaError, Result};
pub use handler::{CaptureBuffer, Handler, HandlerKind};
pub use level::Level;
pub use logger::LoggerHandle;
pub use registry::Registry;
pub use resolver::{ConfigSource, Resolution, Resolver, resolve};
