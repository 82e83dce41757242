//! Error handling for the launcher.
use thiserror::Error;

/// Defines all errors the launcher can run into.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// Missing or unrecognized subcommand, or malformed arguments.
    #[error("Missing or invalid <command>: {0}")]
    InvalidInvocation(#[from] clap::Error),

    /// Error reading the worker configuration file.
    #[error("Failed to read config file: {0}")]
    ConfigReadError(#[source] std::io::Error),

    /// Error parsing YAML configuration.
    #[error("Invalid YAML format: {0}")]
    ConfigParseError(#[from] serde_yaml::Error),

    /// A `${VAR}` reference in the configuration has no value.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// The OS could not create the worker process.
    #[error("Failed to start [{worker}]: {source}")]
    WorkerSpawnFailure {
        /// Name of the worker that failed to start.
        worker: String,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },

    /// Forwarding a signal to the worker failed, usually because it already exited.
    #[error("Failed to forward {signal} to worker: {source}")]
    SignalForwardFailure {
        /// Name of the signal that was forwarded.
        signal: String,
        /// The underlying error that occurred.
        #[source]
        source: nix::errno::Errno,
    },

    /// Blocking or waiting on termination signals failed.
    #[error("Failed to install signal listener: {0}")]
    SignalSetup(#[from] nix::errno::Errno),

    /// Generic I/O failure, e.g. spawning a helper thread.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
