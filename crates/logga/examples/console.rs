//! Example demonstrating how to use logga
//!
//! This example shows the usual flow:
//!
//! 1. Resolve a configuration (LOGGA_CONF, current dir, home dir, bundled)
//! 2. Log through the resolved logger
//! 3. Use the helpers: console output, level, suppression, autolog
//!
//! Run it with `LOGGA_CONF=/some/dir` to pick up `/some/dir/log.conf`.

use logga::{Logga, autolog};

fn main()
{
    // Optional: see logga's own diagnostics (which log.conf was chosen)
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let logga = Logga::init().expect("Failed to initialize logging");
    println!("configuration: {:?}", logga.resolution());

    let log = logga.log();
    log.critical("This is a critical message");
    log.error("This is an error message");
    log.warning("This is a warning message");
    log.info("This is an info message");
    log.debug("This is a debug message");

    // Console only, with the console format
    logga.set_console();
    log.info("Now on the console");

    // NOTSET and DEBUG set DEBUG; INFO, WARNING, ERROR and CRITICAL all set INFO
    logga.set_level("ERROR").expect("valid level");
    log.info("Still visible after set_level(\"ERROR\")");
    log.debug("Hidden after set_level(\"ERROR\")");

    logga.set_level("DEBUG").expect("valid level");
    autolog!(logga, "Reached the autolog call");

    logga.suppress_logging();
    log.error("Hidden while suppressed");
    log.critical("Critical gets through");
    logga.enable_logging();

    logga.shutdown();
}
