use std::io;
use std::thread;

use nix::sys::signal::{SigSet, Signal};
use tracing::{debug, error};

use crate::state::ForegroundJobs;

/// The signals the shell relays to its foreground pipeline instead of acting on them
pub fn forwarded_signals() -> SigSet {
    let mut signals = SigSet::empty();
    signals.add(Signal::SIGINT);
    signals.add(Signal::SIGTERM);
    signals
}

/// Blocks SIGINT and SIGTERM in the calling thread and starts a thread that relays them to the
/// foreground pipeline instead
/// * Must run before any other thread is started, since new threads inherit the signal mask;
/// * children inherit it through exec too, so the spawner unblocks these signals in each child
pub fn forward_interrupts(jobs: ForegroundJobs) -> io::Result<()> {
    let signals = forwarded_signals();
    signals.thread_block()?;

    thread::Builder::new()
        .name("interrupts".to_string())
        .spawn(move || loop {
            match signals.wait() {
                Ok(signal) => {
                    let delivered = jobs.forward(signal);
                    debug!(%signal, delivered, "forwarded");
                }
                Err(e) => {
                    error!(%e, "stopped listening for interrupts");
                    return;
                }
            }
        })?;

    Ok(())
}
