//! Parent process watchdog
//!
//! Waits on a dedicated thread for the parent application to exit and then
//! raises the host's "parent exited" signal. The signal never runs shutdown
//! logic itself; it hands the reason to whoever owns the host's main loop.

mod process;

use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

pub use process::{ParentProcess, open_parent};

/// Why the host is told to shut down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentExit {
    /// The parent process exited
    Exited,
    /// No handle on the parent could be acquired
    Unavailable(String),
    /// Waiting on the parent failed after the handle was acquired
    WaitFailed(String),
}

impl fmt::Display for ParentExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited => f.write_str("parent exited"),
            Self::Unavailable(reason) => write!(f, "parent unavailable: {reason}"),
            Self::WaitFailed(reason) => write!(f, "waiting on parent failed: {reason}"),
        }
    }
}

/// The host's "parent exited" event. Fires at most once, however many
/// clones call [`ExitSignal::fire`].
#[derive(Clone)]
pub struct ExitSignal {
    fired: Arc<AtomicBool>,
    deliver: Arc<dyn Fn(ParentExit) + Send + Sync>,
}

impl ExitSignal {
    /// `deliver` is called once, on the firing thread, with the reason
    pub fn new(deliver: impl Fn(ParentExit) + Send + Sync + 'static) -> Self {
        Self {
            fired: Arc::new(AtomicBool::new(false)),
            deliver: Arc::new(deliver),
        }
    }

    /// Fire the signal. Returns false if it had already fired.
    pub fn fire(&self, reason: ParentExit) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        (self.deliver)(reason);
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ExitSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExitSignal")
            .field("fired", &self.has_fired())
            .finish_non_exhaustive()
    }
}

pub struct Watchdog;

impl Watchdog {
    /// Watch process `pid`
    pub fn watch(pid: u32, poll_interval: Duration, signal: ExitSignal) -> Option<JoinHandle<()>> {
        Self::start(open_parent(pid, poll_interval), signal)
    }

    /// Start watching an acquired parent handle.
    ///
    /// If acquisition failed the signal fires immediately and no thread is
    /// started. A failed wait also fires the signal.
    pub fn start(
        parent: io::Result<Box<dyn ParentProcess>>,
        signal: ExitSignal,
    ) -> Option<JoinHandle<()>> {
        let parent = match parent {
            Ok(parent) => parent,
            Err(e) => {
                tracing::info!(error = %e, "Parent process unavailable");
                signal.fire(ParentExit::Unavailable(e.to_string()));
                return None;
            }
        };

        let spawned = std::thread::Builder::new()
            .name("parent-watchdog".to_string())
            .spawn({
                let signal = signal.clone();
                move || {
                    let reason = match parent.wait_for_exit() {
                        Ok(()) => ParentExit::Exited,
                        Err(e) => {
                            tracing::warn!(error = %e, "Waiting on parent process failed");
                            ParentExit::WaitFailed(e.to_string())
                        }
                    };
                    tracing::info!(%reason, "Parent watchdog finished");
                    signal.fire(reason);
                }
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to start parent watchdog");
                signal.fire(ParentExit::WaitFailed(e.to_string()));
                None
            }
        }
    }
}
