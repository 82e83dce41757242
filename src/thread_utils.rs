//! Helper threads that log inside the caller's span.
use std::{
    io,
    thread::{self, JoinHandle},
};

use tracing::{Dispatch, Span, dispatcher};

/// Spawns a named thread that runs `f` with the spawning thread's current
/// span entered and its subscriber installed.
pub(crate) fn spawn_in_current_span<F>(name: &str, f: F) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let span = Span::current();
    let dispatch = dispatcher::get_default(Dispatch::clone);

    thread::Builder::new().name(name.into()).spawn(move || {
        dispatcher::with_default(&dispatch, || {
            let _span = span.entered();
            f()
        })
    })
}
