//! Tests for the process-wide instance
//!
//! Kept in its own test binary: the instance can only be installed once per
//! process.

use logga::config::CandidateLocations;
use logga::{LoggaError, Resolver, global};

#[test]
fn test_global_installs_once()
{
    assert!(global::get().is_none());

    let resolver = Resolver::new(CandidateLocations::default());
    let installed = global::init_with(&resolver).unwrap();
    assert!(installed.resolution().is_bundled());
    assert!(std::ptr::eq(installed, global::get().unwrap()));

    let second = global::init_with(&resolver);
    assert!(matches!(second, Err(LoggaError::AlreadyInitialized)));
}
