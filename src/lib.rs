//! Launcher for the highcharts-convert rendering worker. It starts the headless
//! engine with the configured host, port and passthrough arguments, relays
//! SIGINT/SIGTERM to it, and reports how it ended.

/// CLI interface.
pub mod cli;

/// Configuration management.
pub mod config;

/// Defaults and shared names.
pub mod constants;

/// Error handling.
pub mod error;

/// Termination signal listener.
pub mod signals;

/// Worker process ownership and lifecycle.
pub mod supervisor;

/// Span-aware helper threads.
mod thread_utils;

/// Worker command construction.
pub mod worker;

#[doc(hidden)]
pub mod test_utils;
