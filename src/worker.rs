//! Worker command construction and exit watching.
use std::{
    ffi::OsString,
    io,
    os::unix::process::ExitStatusExt,
    process::{Child, Command, Stdio},
    sync::mpsc::Sender,
    thread::JoinHandle,
};

use tracing::{debug, warn};

use crate::{
    config::{StartupConfig, WorkerConfig},
    constants::{WORKER_HOST_FLAG, WORKER_PORT_FLAG},
    signals,
    supervisor::SupervisorEvent,
    thread_utils::spawn_in_current_span,
};

/// Builds the worker's argument vector:
/// `[script, "-port", port, "-host", hostname, ...extra_args]`.
pub fn child_args(config: &StartupConfig, worker: &WorkerConfig) -> Vec<OsString> {
    let mut args = Vec::with_capacity(5 + config.extra_args.len());
    args.push(worker.script.clone().into_os_string());
    args.push(WORKER_PORT_FLAG.into());
    args.push(config.port.to_string().into());
    args.push(WORKER_HOST_FLAG.into());
    args.push(config.hostname.clone().into());
    args.extend(config.extra_args.iter().map(OsString::from));
    args
}

/// Builds the command that runs the worker with inherited standard streams.
pub fn build_command(config: &StartupConfig, worker: &WorkerConfig) -> Command {
    let mut cmd = Command::new(&worker.program);
    cmd.args(child_args(config, worker));
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    signals::unblock_in_child(&mut cmd);
    cmd
}

/// Waits for `child` on a dedicated thread and reports its exit code once.
pub fn watch_exit(
    mut child: Child,
    events: Sender<SupervisorEvent>,
) -> io::Result<JoinHandle<()>> {
    spawn_in_current_span("worker-exit", move || {
        let code = match child.wait() {
            Ok(status) => {
                if let Some(signal) = status.signal() {
                    debug!("Worker terminated by signal {signal}");
                }
                status.code()
            }
            Err(err) => {
                warn!("Failed to wait on worker: {err}");
                None
            }
        };
        let _ = events.send(SupervisorEvent::Exited(code));
    })
}
