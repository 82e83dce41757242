use std::{io::IsTerminal, process, sync::mpsc};

use tracing::{error, info_span};
use tracing_subscriber::EnvFilter;

use chart_export_server::{
    cli::{Cli, Commands, StartArgs, parse_args},
    config,
    constants::EXIT_FAILURE,
    error::LauncherError,
    signals::SignalListener,
    supervisor::Supervisor,
};

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(LauncherError::InvalidInvocation(err)) => err.exit(),
        Err(err) => {
            eprintln!("{err}");
            process::exit(EXIT_FAILURE);
        }
    };
    init_logging(&args);

    let code = match args.command {
        Commands::Start(start) => match start_worker(&start) {
            Ok(code) => code,
            Err(err) => {
                error!("{err}");
                EXIT_FAILURE
            }
        },
    };

    process::exit(code);
}

fn init_logging(args: &Cli) {
    let filter = if let Some(level) = args.log_level {
        EnvFilter::new(level.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

/// Launches the worker and supervises it until a signal or its exit.
fn start_worker(args: &StartArgs) -> Result<i32, LauncherError> {
    let launch = config::resolve(args)?;

    let _span = info_span!("worker", name = %launch.worker.name).entered();

    // Must run before any thread is spawned.
    let listener = SignalListener::install()?;
    let (tx, rx) = mpsc::channel();
    listener.spawn(tx.clone())?;

    let mut supervisor = Supervisor::new(launch.worker);
    supervisor.launch(&launch.startup, tx);
    Ok(supervisor.run(&rx))
}
