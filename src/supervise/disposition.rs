//! Classification of worker termination statuses.

use std::fmt;

use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;

/// How a worker left the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Normal exit with a status code.
    Exited(i32),
    /// Killed by a signal; the interrupted "SIG" worker lands here.
    Signaled(Signal),
    /// A wait status that is not a termination (stopped, continued).
    NotTerminated,
}

impl Disposition {
    /// Whether the worker terminated by exiting, with any code.
    ///
    /// Only normal exits have a readable result channel; a failed worker
    /// still exits normally (code 1) and simply left no data behind.
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Exited(_))
    }

    /// Whether the worker completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }

    /// Whether the worker was terminated by a signal.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Signaled(_))
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with code {}", code),
            Self::Signaled(sig) => write!(f, "killed by signal {:?}", sig),
            Self::NotTerminated => write!(f, "not a termination"),
        }
    }
}

/// Classify a raw wait status.
pub fn analyze_wait_status(status: WaitStatus) -> Disposition {
    match status {
        WaitStatus::Exited(_, code) => Disposition::Exited(code),
        WaitStatus::Signaled(_, signal, _) => Disposition::Signaled(signal),
        _ => Disposition::NotTerminated,
    }
}
