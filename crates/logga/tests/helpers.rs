//! Tests for the helpers operating on the resolved logger

use std::sync::Arc;

use logga::config::{CandidateLocations, StreamTarget};
use logga::format::PatternFormat;
use logga::{CaptureBuffer, Handler, HandlerKind, Level, Logga, LoggaError, Resolver, autolog, caller};

/// A bundled setup whose resolved logger writes `LEVEL message` into a buffer.
fn captured() -> (Logga, CaptureBuffer)
{
    let logga = Logga::init_with(&Resolver::new(CandidateLocations::default())).unwrap();
    let buffer = CaptureBuffer::new();
    let format = PatternFormat::parse("%(levelname)s %(message)s", None).unwrap();
    logga.log().clear_handlers();
    logga.log().add_handler(Handler::capture(&buffer, Level::NotSet, format));
    (logga, buffer)
}

#[test]
fn test_set_level_debug_and_notset_pass_debug()
{
    let (logga, output) = captured();

    for name in ["DEBUG", "NOTSET"] {
        assert_eq!(logga.set_level(name).unwrap(), Level::Debug);
        logga.log().debug("detail");
    }

    assert_eq!(output.lines(), vec!["DEBUG detail", "DEBUG detail"]);
}

#[test]
fn test_set_level_collapses_to_info()
{
    let (logga, output) = captured();

    for name in ["INFO", "WARNING", "ERROR", "CRITICAL"] {
        assert_eq!(logga.set_level(name).unwrap(), Level::Info);
        assert_eq!(logga.log().level(), Level::Info);
        logga.log().debug("hidden");
        logga.log().info(name);
    }

    assert_eq!(output.lines(), vec!["INFO INFO", "INFO WARNING", "INFO ERROR", "INFO CRITICAL"]);
}

#[test]
fn test_set_level_is_case_insensitive()
{
    let (logga, _output) = captured();
    assert_eq!(logga.set_level("debug").unwrap(), Level::Debug);
    assert_eq!(logga.set_level("Warning").unwrap(), Level::Info);
}

#[test]
fn test_set_level_rejects_unknown_names()
{
    let (logga, _output) = captured();
    logga.set_level("DEBUG").unwrap();

    let err = logga.set_level("bogus").unwrap_err();

    assert!(matches!(err, LoggaError::InvalidLevel(_)));
    assert!(err.to_string().starts_with("Invalid argument"));
    assert_eq!(logga.log().level(), Level::Debug);
}

#[test]
fn test_suppress_then_enable()
{
    let (logga, output) = captured();
    logga.set_level("DEBUG").unwrap();

    logga.suppress_logging();
    logga.log().debug("d1");
    logga.log().info("i1");
    logga.log().error("e1");
    logga.log().critical("c1");

    logga.enable_logging();
    logga.log().debug("d2");
    logga.log().info("i2");

    assert_eq!(output.lines(), vec!["CRITICAL c1", "DEBUG d2", "INFO i2"]);
}

#[test]
fn test_suppression_covers_every_logger()
{
    let (logga, _output) = captured();
    let other = logga.registry().logger("other");

    logga.suppress_logging();

    assert!(!other.is_enabled_for(Level::Error));
    assert!(other.is_enabled_for(Level::Critical));
}

#[test]
fn test_set_console_state()
{
    let (logga, _output) = captured();
    logga.log().set_propagate(true);
    logga.set_level("INFO").unwrap();

    logga.set_console();

    let handlers = logga.log().handlers();
    assert_eq!(handlers.len(), 1);
    assert_eq!(handlers[0].kind(), &HandlerKind::Stream(StreamTarget::Stderr));
    assert!(!logga.log().propagate());
    assert_eq!(logga.log().level(), Level::NotSet);
    assert!(logga.log().is_enabled_for(Level::Debug));
}

#[test]
fn test_set_console_is_idempotent()
{
    let (logga, _output) = captured();

    logga.set_console();
    logga.set_console();

    assert_eq!(logga.log().handlers().len(), 1);
    assert!(logga.log().handlers()[0].is_stream());
    assert!(!logga.log().propagate());
    assert_eq!(logga.log().level(), Level::NotSet);
}

fn report_progress(logga: &Logga) -> u32
{
    let line = line!() + 1;
    autolog!(logga, "progress");
    line
}

#[test]
fn test_autolog_reports_call_site()
{
    let (logga, output) = captured();
    logga.set_level("DEBUG").unwrap();

    let line = report_progress(&logga);

    let expected = format!("DEBUG progress: report_progress in {}:{line}", file!());
    assert_eq!(output.lines(), vec![expected]);
}

#[test]
fn test_autolog_silent_without_debug()
{
    let (logga, output) = captured();
    logga.set_level("INFO").unwrap();

    report_progress(&logga);

    assert!(output.contents().is_empty());
}

#[test]
fn test_autolog_silent_when_suppressed()
{
    let (logga, output) = captured();
    logga.set_level("DEBUG").unwrap();
    logga.suppress_logging();

    report_progress(&logga);

    assert!(output.contents().is_empty());
}

#[test]
fn test_caller_inside_closure_reports_function()
{
    let caller = (|| caller!())();
    assert_eq!(caller.function, "test_caller_inside_closure_reports_function");
    assert_eq!(caller.file, file!());
}

#[test]
fn test_function_name_in_pattern()
{
    let logga = Logga::init_with(&Resolver::new(CandidateLocations::default())).unwrap();
    let buffer = CaptureBuffer::new();
    let format = PatternFormat::parse("%(funcName)s:%(filename)s:%(message)s", None).unwrap();
    logga.log().clear_handlers();
    logga.log().add_handler(Handler::capture(&buffer, Level::NotSet, format));

    logga.log().info("no caller");
    logga.log().log_with_caller(Level::Info, "with caller", caller!());

    assert_eq!(
        buffer.lines(),
        vec![
            "(unknown function):helpers.rs:no caller".to_string(),
            "test_function_name_in_pattern:helpers.rs:with caller".to_string(),
        ]
    );
}

#[test]
fn test_shared_handler_emits_once_per_logger()
{
    let logga = Logga::init_with(&Resolver::new(CandidateLocations::default())).unwrap();
    let buffer = CaptureBuffer::new();
    let shared = Arc::new(Handler::capture(&buffer, Level::Warning, PatternFormat::default()));

    let a = logga.registry().logger("a");
    let b = logga.registry().logger("b");
    for logger in [&a, &b] {
        logger.set_propagate(false);
        logger.add_shared_handler(Arc::clone(&shared));
    }

    a.warning("from a");
    b.info("filtered by handler");
    b.error("from b");

    assert_eq!(buffer.lines(), vec!["from a", "from b"]);
}
