//! Supervisor that owns the rendering worker for the launcher's lifetime.
//!
//! Spawn failures, worker exit and termination signals all arrive as
//! [`SupervisorEvent`]s on one channel that only the supervisor consumes, so the
//! child handle is never shared.
use std::{
    io,
    sync::mpsc::{Receiver, Sender},
};

use nix::unistd::Pid;
use tracing::{debug, error, info, warn};

use crate::{
    config::{StartupConfig, WorkerConfig},
    constants::{EXIT_FAILURE, EXIT_SHUTDOWN, FALLBACK_EXIT_CODE},
    error::LauncherError,
    signals::TerminationSignal,
    worker,
};

/// Lifecycle of the worker process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    /// Spawn requested, outcome not yet observed.
    Spawning,
    /// The OS created the process.
    Running,
    /// The process terminated. Terminal.
    Exited,
    /// The OS could not create the process. Terminal.
    FailedToStart,
}

impl ChildState {
    /// `Exited` and `FailedToStart` have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, ChildState::Exited | ChildState::FailedToStart)
    }
}

/// Asynchronous notifications handled by the supervisor.
#[derive(Debug)]
pub enum SupervisorEvent {
    /// The worker could not be spawned.
    SpawnFailed(io::Error),
    /// The worker exited; `None` when no exit code is available.
    Exited(Option<i32>),
    /// A termination signal reached the launcher.
    Signal(TerminationSignal),
}

/// What the caller should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep waiting for events.
    Continue,
    /// Exit the launcher with this status.
    Exit(i32),
}

/// Owned view of the spawned worker.
#[derive(Debug)]
pub struct ChildProcessHandle {
    pid: Option<Pid>,
    state: ChildState,
    exit_code: Option<i32>,
}

impl ChildProcessHandle {
    fn new() -> Self {
        Self {
            pid: None,
            state: ChildState::Spawning,
            exit_code: None,
        }
    }

    /// Process identifier, once the spawn succeeded.
    pub fn pid(&self) -> Option<u32> {
        self.pid.map(|pid| pid.as_raw() as u32)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ChildState {
        self.state
    }

    /// Exit code, once the worker exited.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }
}

/// Delivers a termination signal to the worker.
pub trait SignalForwarder {
    fn forward(&mut self, pid: Pid, signal: TerminationSignal) -> Result<(), LauncherError>;
}

/// Forwards signals with `kill(2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct KillForwarder;

impl SignalForwarder for KillForwarder {
    fn forward(&mut self, pid: Pid, signal: TerminationSignal) -> Result<(), LauncherError> {
        nix::sys::signal::kill(pid, signal.as_signal()).map_err(|source| {
            LauncherError::SignalForwardFailure {
                signal: signal.to_string(),
                source,
            }
        })
    }
}

/// Owns exactly one worker process.
pub struct Supervisor<F: SignalForwarder = KillForwarder> {
    worker: WorkerConfig,
    child: ChildProcessHandle,
    forwarder: F,
}

impl Supervisor<KillForwarder> {
    /// Creates a supervisor that forwards signals with `kill(2)`.
    pub fn new(worker: WorkerConfig) -> Self {
        Self::with_forwarder(worker, KillForwarder)
    }
}

impl<F: SignalForwarder> Supervisor<F> {
    /// Creates a supervisor with a custom signal forwarder.
    pub fn with_forwarder(worker: WorkerConfig, forwarder: F) -> Self {
        Self {
            worker,
            child: ChildProcessHandle::new(),
            forwarder,
        }
    }

    /// The worker handle.
    pub fn child(&self) -> &ChildProcessHandle {
        &self.child
    }

    /// The signal forwarder in use.
    pub fn forwarder(&self) -> &F {
        &self.forwarder
    }

    /// Spawns the worker and returns without waiting for it. The handle is
    /// available through [`Supervisor::child`] afterwards.
    ///
    /// Success is logged with the resolved host, port and PID. A spawn
    /// failure is reported as [`SupervisorEvent::SpawnFailed`] on `events`;
    /// worker exit is reported as [`SupervisorEvent::Exited`].
    pub fn launch(&mut self, config: &StartupConfig, events: Sender<SupervisorEvent>) {
        self.child = ChildProcessHandle::new();

        let mut cmd = worker::build_command(config, &self.worker);
        debug!("Executing command: {cmd:?}");

        match cmd.spawn() {
            Ok(child) => {
                let pid = child.id();
                self.child.pid = Some(Pid::from_raw(pid as i32));
                self.child.state = ChildState::Running;
                info!(
                    "Started converter on {}:{} (PID: {pid})",
                    config.hostname, config.port
                );

                if let Err(err) = worker::watch_exit(child, events) {
                    error!("Failed to watch [{}] for exit: {err}", self.worker.name);
                }
            }
            Err(source) => {
                let _ = events.send(SupervisorEvent::SpawnFailed(source));
            }
        }
    }

    /// Applies one event to the worker state.
    pub fn handle(&mut self, event: SupervisorEvent) -> Flow {
        match event {
            SupervisorEvent::SpawnFailed(source) => {
                let err = LauncherError::WorkerSpawnFailure {
                    worker: self.worker.name.clone(),
                    source,
                };
                error!("{err}");
                if self.child.state == ChildState::Spawning {
                    self.child.state = ChildState::FailedToStart;
                }
                Flow::Continue
            }
            SupervisorEvent::Exited(code) => {
                if self.child.state.is_terminal() {
                    debug!("Ignoring exit notification in state {:?}", self.child.state);
                    return Flow::Continue;
                }

                let code = code.unwrap_or(FALLBACK_EXIT_CODE);
                self.child.state = ChildState::Exited;
                self.child.exit_code = Some(code);
                info!("Converter exited (code: {code})");
                Flow::Exit(code)
            }
            SupervisorEvent::Signal(signal) => Flow::Exit(self.terminate(signal)),
        }
    }

    /// Forwards `signal` to a running worker and returns the launcher's exit
    /// status. Never waits for the worker.
    pub fn terminate(&mut self, signal: TerminationSignal) -> i32 {
        match (self.child.state, self.child.pid) {
            (ChildState::Running, Some(pid)) => {
                if let Err(err) = self.forwarder.forward(pid, signal) {
                    debug!("{err}");
                }
            }
            (state, _) => debug!("Worker is {state:?}; not forwarding {signal}"),
        }

        warn!("Terminating converter (received {signal})");
        EXIT_SHUTDOWN
    }

    /// Handles events until one asks the launcher to exit.
    pub fn run(&mut self, events: &Receiver<SupervisorEvent>) -> i32 {
        loop {
            let Ok(event) = events.recv() else {
                warn!("No further events can arrive; exiting");
                return EXIT_FAILURE;
            };

            if let Flow::Exit(code) = self.handle(event) {
                return code;
            }
        }
    }
}
