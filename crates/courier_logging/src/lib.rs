#![deny(missing_docs)]
//! Shared logging setup for the courier workspace.
//!
//! Wraps `log` + `simplelog` so the bot binary and every integration test
//! initialize the global logger the same way.

use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

fn default_level() -> log::LevelFilter {
    // Use debug level in debug builds, info in release builds.
    if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Initializes the terminal logger for the bot process.
pub fn init() {
    // Ignore the error if a logger was already set.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        default_level(),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    init();
}
