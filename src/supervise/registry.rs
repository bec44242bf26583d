//! Worker bookkeeping shared between the supervisor and the notifier.
//!
//! The table is an arena of worker records with stable handles assigned at
//! registration. The supervisor appends entries and assigns pids; the
//! notifier correlates reaped pids back to entries and performs the
//! authoritative terminated-count increment.

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use nix::unistd::Pid;

use super::channel::ChannelReader;

/// Literal argument that requests an interrupt-wait worker.
pub const INTERRUPT_TOKEN: &str = "SIG";

/// What a worker has been asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerInput {
    /// Histogram the contents of this file.
    File(PathBuf),
    /// Wait idle for an interrupt from the supervisor.
    Interrupt,
}

impl WorkerInput {
    /// Parse a raw invocation argument.
    pub fn parse(raw: &str) -> Self {
        if raw == INTERRUPT_TOKEN {
            Self::Interrupt
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    pub fn is_interrupt(&self) -> bool {
        matches!(self, Self::Interrupt)
    }
}

impl fmt::Display for WorkerInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Interrupt => write!(f, "{}", INTERRUPT_TOKEN),
        }
    }
}

/// Stable handle for one worker, assigned at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerId(usize);

impl WorkerId {
    /// Position of this worker in the spawn order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One registered worker.
struct WorkerEntry {
    input: WorkerInput,
    /// Set once at spawn, immutable thereafter.
    pid: Option<Pid>,
    /// Claimed exactly once by the notifier.
    reader: Option<ChannelReader>,
}

/// Arena of worker records plus the run counters.
pub struct WorkerTable {
    entries: Mutex<Vec<WorkerEntry>>,
    spawned: AtomicUsize,
    terminated: AtomicUsize,
}

impl WorkerTable {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            spawned: AtomicUsize::new(0),
            terminated: AtomicUsize::new(0),
        }
    }

    /// Register a worker before it is spawned.
    pub fn register(&self, input: WorkerInput, reader: ChannelReader) -> WorkerId {
        let mut entries = self.entries.lock().expect("worker table poisoned");
        entries.push(WorkerEntry {
            input,
            pid: None,
            reader: Some(reader),
        });
        WorkerId(entries.len() - 1)
    }

    /// Record the process identity once the worker is running.
    pub fn record_spawn(&self, id: WorkerId, pid: Pid) {
        {
            let mut entries = self.entries.lock().expect("worker table poisoned");
            let entry = &mut entries[id.0];
            debug_assert!(entry.pid.is_none(), "pid assigned twice");
            entry.pid = Some(pid);
        }
        self.spawned.fetch_add(1, Ordering::SeqCst);
    }

    /// Authoritative terminated-count increment, owned by the notifier.
    ///
    /// Returns the new count.
    pub fn note_termination(&self) -> usize {
        self.terminated.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Claim the channel read end for a terminated worker.
    ///
    /// Returns `None` when no entry matches the pid or the channel was
    /// already claimed; callers report and continue.
    pub fn claim_channel(&self, pid: Pid) -> Option<(WorkerId, WorkerInput, ChannelReader)> {
        let mut entries = self.entries.lock().expect("worker table poisoned");
        entries
            .iter_mut()
            .enumerate()
            .find(|(_, entry)| entry.pid == Some(pid))
            .and_then(|(i, entry)| {
                entry
                    .reader
                    .take()
                    .map(|reader| (WorkerId(i), entry.input.clone(), reader))
            })
    }

    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    pub fn terminated(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }
}

impl Default for WorkerTable {
    fn default() -> Self {
        Self::new()
    }
}
