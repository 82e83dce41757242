//! Termination signal handling.
//!
//! SIGINT and SIGTERM are blocked on the main thread before any other thread
//! exists, so every thread inherits the mask and the dedicated listener is the
//! only place they are observed. Each signal is consumed once; afterwards the
//! listener unblocks the set so a repeated signal gets the default action.
use std::{
    io,
    os::unix::process::CommandExt,
    process::Command,
    sync::mpsc::Sender,
    thread::{self, JoinHandle},
};

use nix::{
    errno::Errno,
    sys::signal::{SigSet, Signal},
};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use tracing::{debug, error};

use crate::{
    error::LauncherError, supervisor::SupervisorEvent, thread_utils::spawn_in_current_span,
};

/// Why shutdown was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, EnumIter)]
pub enum TerminationSignal {
    /// Interrupt from the terminal (Ctrl-C).
    #[strum(serialize = "SIGINT")]
    Interrupt,
    /// Polite termination request, e.g. from an init system.
    #[strum(serialize = "SIGTERM")]
    Terminate,
}

impl TerminationSignal {
    /// The OS signal this value stands for.
    pub fn as_signal(self) -> Signal {
        match self {
            Self::Interrupt => Signal::SIGINT,
            Self::Terminate => Signal::SIGTERM,
        }
    }

    /// Maps an OS signal back, if it is one we listen for.
    pub fn from_signal(signal: Signal) -> Option<Self> {
        Self::iter().find(|candidate| candidate.as_signal() == signal)
    }
}

/// The set of signals the listener consumes.
pub fn termination_set() -> SigSet {
    let mut set = SigSet::empty();
    for signal in TerminationSignal::iter() {
        set.add(signal.as_signal());
    }
    set
}

/// Unblocks the termination signals in a spawned child before `exec`, since
/// the blocked mask would otherwise be inherited by the worker.
pub fn unblock_in_child(cmd: &mut Command) {
    let set = termination_set();
    unsafe {
        cmd.pre_exec(move || set.thread_unblock().map_err(io::Error::from));
    }
}

/// One-shot listener for termination signals.
#[derive(Debug)]
pub struct SignalListener {
    set: SigSet,
}

impl SignalListener {
    /// Blocks the termination signals on the calling thread.
    ///
    /// Call before spawning any thread so they all inherit the mask.
    pub fn install() -> Result<Self, LauncherError> {
        let set = termination_set();
        set.thread_block()?;
        Ok(Self { set })
    }

    /// Starts the listener thread. The first termination signal is sent on
    /// `events`; nothing is sent after that.
    pub fn spawn(
        self,
        events: Sender<SupervisorEvent>,
    ) -> Result<JoinHandle<()>, LauncherError> {
        let handle = spawn_in_current_span("signal-listener", move || self.listen(events))?;
        Ok(handle)
    }

    fn listen(self, events: Sender<SupervisorEvent>) {
        let signal = loop {
            match self.set.wait() {
                Ok(raw) => {
                    if let Some(signal) = TerminationSignal::from_signal(raw) {
                        break signal;
                    }
                    debug!("Ignoring unexpected signal {raw}");
                }
                Err(Errno::EINTR) => continue,
                Err(err) => {
                    error!("Signal listener stopped: {err}");
                    return;
                }
            }
        };

        debug!("Received {signal}");
        if let Err(err) = self.set.thread_unblock() {
            debug!("Failed to unblock termination signals: {err}");
        }
        if events.send(SupervisorEvent::Signal(signal)).is_err() {
            return;
        }

        // Stay alive with the set unblocked so a repeated signal is delivered
        // here with its default action.
        loop {
            thread::park();
        }
    }
}
