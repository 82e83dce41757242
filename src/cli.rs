//! Command-line interface for the chart export server launcher.
use std::{ffi::OsString, path::PathBuf, str::FromStr};

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    constants::{ENV_WORKER_PROGRAM, ENV_WORKER_SCRIPT},
    error::LauncherError,
};

/// Log verbosity given on the command line: a level name ("warn", "debug")
/// or a number from 0 (off) to 5 (trace).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogLevelArg(LevelFilter);

impl LogLevelArg {
    /// The level as an `EnvFilter` directive.
    pub fn as_str(&self) -> &'static str {
        const DIRECTIVES: [(LevelFilter, &str); 6] = [
            (LevelFilter::OFF, "off"),
            (LevelFilter::ERROR, "error"),
            (LevelFilter::WARN, "warn"),
            (LevelFilter::INFO, "info"),
            (LevelFilter::DEBUG, "debug"),
            (LevelFilter::TRACE, "trace"),
        ];
        DIRECTIVES
            .iter()
            .find(|(level, _)| *level == self.0)
            .map_or("info", |(_, directive)| directive)
    }
}

impl FromStr for LogLevelArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_ascii_lowercase();
        let canonical = match value.as_str() {
            "" => return Err("log level cannot be empty".into()),
            "err" => "error",
            "warning" => "warn",
            "information" => "info",
            other => other,
        };

        // `LevelFilter` itself accepts the names plus "0" through "5".
        canonical
            .parse::<LevelFilter>()
            .map(LogLevelArg)
            .map_err(|_| format!("invalid log level '{value}' (expected a name or 0-5)"))
    }
}

/// Command-line interface for the launcher.
#[derive(Debug, Parser)]
#[command(name = "chart-export-server", version, author, propagate_version = true)]
#[command(about = "Launches and supervises the highcharts-convert rendering worker", long_about = None)]
#[command(after_help = "Try chart-export-server start --help for available options")]
pub struct Cli {
    /// Override the logging verbosity for this invocation only.
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Starts the highcharts-convert HTTP server.
    #[command(disable_help_flag = true)]
    Start(StartArgs),
}

/// Options accepted by `start`.
///
/// `-h` is taken by the hostname, so help is only available as `--help`.
#[derive(Debug, Clone, Args)]
pub struct StartArgs {
    /// Hostname of the server [default: 127.0.0.1]
    #[arg(short = 'h', long = "hostname", visible_alias = "host", value_name = "HOSTNAME")]
    pub hostname: Option<String>,

    /// Port the server will listen on [default: 3030]
    #[arg(short, long, value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// YAML file with worker settings and default hostname/port.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Headless engine executable used to run the worker script.
    #[arg(long, value_name = "PATH", env = ENV_WORKER_PROGRAM)]
    pub worker_program: Option<PathBuf>,

    /// Entry script handed to the worker executable.
    #[arg(long, value_name = "PATH", env = ENV_WORKER_SCRIPT)]
    pub worker_script: Option<PathBuf>,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Positional arguments passed through to the worker.
    #[arg(value_name = "ARGS")]
    pub extra_args: Vec<String>,

    /// Arguments after `--`, passed through verbatim, hyphens included.
    #[arg(value_name = "WORKER_ARGS", last = true)]
    pub trailing_args: Vec<String>,
}

impl StartArgs {
    /// Everything the launcher did not consume, in command-line order.
    ///
    /// Positionals always precede the `--` residue, so concatenating the two
    /// keeps the original ordering.
    pub fn passthrough_args(&self) -> Vec<String> {
        self.extra_args
            .iter()
            .chain(&self.trailing_args)
            .cloned()
            .collect()
    }
}

/// Parses the process arguments.
pub fn parse_args() -> Result<Cli, LauncherError> {
    parse_from(std::env::args_os())
}

/// Parses an explicit argument sequence; the first item is the program name.
///
/// Help and version requests also come back as `InvalidInvocation`; calling
/// `exit()` on the inner clap error prints them and exits with status 0.
pub fn parse_from<I, T>(args: I) -> Result<Cli, LauncherError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Ok(Cli::try_parse_from(args)?)
}
