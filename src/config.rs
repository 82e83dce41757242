//! Configuration management for the launcher.
//!
//! Settings are resolved with the precedence command-line flag, then the
//! optional YAML worker file, then the built-in defaults.
use regex::Regex;
use serde::Deserialize;
use std::{
    env, fs,
    num::NonZeroU16,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use crate::{
    cli::StartArgs,
    constants::{
        DEFAULT_HOSTNAME, DEFAULT_PORT, DEFAULT_WORKER_PROGRAM, WORKER_NAME,
        WORKER_SCRIPT_DIR, WORKER_SCRIPT_FILE,
    },
    error::LauncherError,
};

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?").expect("env var pattern is valid")
});

/// Network settings handed to the worker, fixed once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// Hostname the worker listens on.
    pub hostname: String,
    /// Port the worker listens on; never zero.
    pub port: u16,
    /// Unparsed residue forwarded to the worker in original order.
    pub extra_args: Vec<String>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            port: DEFAULT_PORT,
            extra_args: Vec::new(),
        }
    }
}

/// Identifies the worker executable and its entry script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Name used in log lines.
    pub name: String,
    /// Headless engine executable.
    pub program: PathBuf,
    /// Entry script, first element of the worker's argument vector.
    pub script: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: WORKER_NAME.to_string(),
            program: PathBuf::from(DEFAULT_WORKER_PROGRAM),
            script: default_script_path(),
        }
    }
}

/// Everything needed to launch the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Host, port and passthrough arguments.
    pub startup: StartupConfig,
    /// Worker executable and script.
    pub worker: WorkerConfig,
}

/// Represents the structure of the optional YAML worker file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Hostname used when `--hostname` is absent.
    pub hostname: Option<String>,
    /// Port used when `--port` is absent.
    pub port: Option<NonZeroU16>,
    /// Worker overrides.
    pub worker: Option<WorkerSection>,
    /// Directory the file was loaded from; relative script paths resolve here.
    #[serde(skip)]
    pub project_dir: Option<PathBuf>,
}

/// Worker overrides in the YAML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerSection {
    pub name: Option<String>,
    pub program: Option<String>,
    pub script: Option<String>,
}

impl WorkerSection {
    /// Resolves the script path against a base directory.
    pub fn script_path(&self, base: &Path) -> Option<PathBuf> {
        self.script.as_ref().map(|script| {
            let path = Path::new(script);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            }
        })
    }
}

/// `<launcher dir>/lib/highcharts-convert.js`, or a relative path when the
/// launcher location is unknown.
fn default_script_path() -> PathBuf {
    let relative = Path::new(WORKER_SCRIPT_DIR).join(WORKER_SCRIPT_FILE);
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&relative)))
        .unwrap_or(relative)
}

/// Expands `$VAR` and `${VAR}` references from the environment.
fn expand_env_vars(input: &str) -> Result<String, LauncherError> {
    let mut expanded = String::with_capacity(input.len());
    let mut last = 0;

    for caps in ENV_VAR_PATTERN.captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let var_name = &caps[1];
        let value =
            env::var(var_name).map_err(|_| LauncherError::MissingEnvVar(var_name.into()))?;

        expanded.push_str(&input[last..whole.start()]);
        expanded.push_str(&value);
        last = whole.end();
    }

    expanded.push_str(&input[last..]);
    Ok(expanded)
}

/// Loads and parses a worker file, expanding environment variables first.
pub fn load_config_file(path: &Path) -> Result<ConfigFile, LauncherError> {
    let content = fs::read_to_string(path).map_err(|e| {
        LauncherError::ConfigReadError(std::io::Error::new(
            e.kind(),
            format!("{} ({})", e, path.display()),
        ))
    })?;

    let expanded = expand_env_vars(&content)?;

    // An empty document is a valid, empty configuration.
    let mut config: ConfigFile = if expanded.trim().is_empty() {
        ConfigFile::default()
    } else {
        serde_yaml::from_str(&expanded)?
    };

    let base_path = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    config.project_dir = Some(base_path);
    Ok(config)
}

/// Resolves the parsed `start` options into a launch configuration.
pub fn resolve(args: &StartArgs) -> Result<LaunchConfig, LauncherError> {
    let file = match &args.config {
        Some(path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };
    Ok(merge(args, file))
}

fn merge(args: &StartArgs, file: ConfigFile) -> LaunchConfig {
    let defaults = StartupConfig::default();
    let startup = StartupConfig {
        hostname: args
            .hostname
            .clone()
            .or(file.hostname)
            .unwrap_or(defaults.hostname),
        port: args
            .port
            .or(file.port.map(NonZeroU16::get))
            .unwrap_or(defaults.port),
        extra_args: args.passthrough_args(),
    };

    let base = file.project_dir.unwrap_or_else(|| PathBuf::from("."));
    let section = file.worker.unwrap_or_default();
    let defaults = WorkerConfig::default();
    let worker = WorkerConfig {
        script: args
            .worker_script
            .clone()
            .or_else(|| section.script_path(&base))
            .unwrap_or(defaults.script),
        name: section.name.unwrap_or(defaults.name),
        program: args
            .worker_program
            .clone()
            .or(section.program.map(PathBuf::from))
            .unwrap_or(defaults.program),
    };

    LaunchConfig { startup, worker }
}
