use std::sync::{Arc, Mutex, MutexGuard};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

/// Process ids of the pipeline currently running in the foreground.
/// Shared between the REPL thread, which registers children as it spawns and reaps them,
/// and the interrupt listener, which forwards signals to them.
#[derive(Debug, Clone, Default)]
pub struct ForegroundJobs {
    pids: Arc<Mutex<Vec<u32>>>,
}

impl ForegroundJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, pid: u32) {
        self.lock().push(pid);
    }

    pub fn release(&self, pid: u32) {
        self.lock().retain(|p| *p != pid);
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sends a signal to every foreground process, returning how many received it
    pub fn forward(&self, signal: Signal) -> usize {
        let pids = self.lock();
        let mut delivered = 0;
        for pid in pids.iter() {
            match kill(Pid::from_raw(*pid as i32), signal) {
                Ok(()) => delivered += 1,
                // The child may have exited but not yet been reaped and released
                Err(e) => tracing::debug!(pid, %e, "could not forward {signal}"),
            }
        }

        delivered
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u32>> {
        // A panic while holding the lock cannot leave the list half-updated
        self.pids.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
