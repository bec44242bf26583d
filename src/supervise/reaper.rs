//! Completion notifier: reaps terminated workers and collects results.
//!
//! A dedicated thread blocks in `waitpid` for any child, then drains every
//! termination that is already pending before blocking again, so the
//! mechanism stays armed for the lifetime of the run. Each termination is
//! accounted against the shared counters, its result channel is drained if
//! the exit was normal, and a [`CompletionRecord`] is posted back to the
//! supervisor over an mpsc channel.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use crate::error::{ParhistError, Result};
use crate::histogram::Histogram;
use crate::report;
use super::disposition::{Disposition, analyze_wait_status};
use super::registry::WorkerTable;

/// Pause before retrying while no worker has been spawned yet.
const ARM_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// What the notifier learned about one terminated worker.
///
/// Produced per termination and consumed immediately by the supervisor's
/// wait loop; not retained afterward.
#[derive(Debug)]
pub struct CompletionRecord {
    pub pid: Pid,
    pub disposition: Disposition,
    /// Histogram received over the worker's channel, if any.
    pub histogram: Option<Histogram>,
}

/// Handle to the armed notifier.
pub struct Notifier {
    thread: JoinHandle<Result<()>>,
    events: Receiver<CompletionRecord>,
}

impl Notifier {
    /// Arm the notifier.
    ///
    /// Must happen before the first spawn so that no termination can go
    /// unnoticed. `expected` is the total number of workers the run will
    /// create; the thread exits once that many terminations are drained.
    pub fn arm(table: Arc<WorkerTable>, expected: usize, output_dir: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("completion-notifier".to_string())
            .spawn(move || reap_loop(&table, expected, &output_dir, &tx))
            .expect("Failed to spawn notifier thread");
        Self { thread, events: rx }
    }

    /// Receive the next completion record, blocking until one arrives.
    pub fn recv(&self) -> Result<CompletionRecord> {
        self.events.recv().map_err(|_| {
            ParhistError::Channel(
                "completion notifier stopped before all workers terminated".to_string(),
            )
        })
    }

    /// Join the notifier thread after the last completion was received.
    pub fn join(self) -> Result<()> {
        match self.thread.join() {
            Ok(result) => result,
            Err(_) => Err(ParhistError::Channel(
                "completion notifier panicked".to_string(),
            )),
        }
    }
}

fn reap_loop(
    table: &WorkerTable,
    expected: usize,
    output_dir: &Path,
    events: &Sender<CompletionRecord>,
) -> Result<()> {
    debug!(expected, "Completion notifier armed");

    while table.terminated() < expected {
        // Block until any worker terminates.
        let status = match waitpid(Pid::from_raw(-1), None) {
            Ok(status) => status,
            // No child exists yet: armed before the first spawn.
            Err(Errno::ECHILD) => {
                thread::sleep(ARM_RETRY_INTERVAL);
                continue;
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(ParhistError::Sys(e)),
        };
        handle_termination(table, status, output_dir, events)?;

        // Drain everything already pending before blocking again.
        loop {
            match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
                Ok(status) => handle_termination(table, status, output_dir, events)?,
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(ParhistError::Sys(e)),
            }
        }
    }

    debug!("Completion notifier drained all workers");
    Ok(())
}

/// Process one reaped worker: account it, collect its result, persist.
fn handle_termination(
    table: &WorkerTable,
    status: WaitStatus,
    output_dir: &Path,
    events: &Sender<CompletionRecord>,
) -> Result<()> {
    let Some(pid) = status.pid() else {
        return Ok(());
    };
    let disposition = analyze_wait_status(status);
    if disposition == Disposition::NotTerminated {
        return Ok(());
    }

    let terminated = table.note_termination();
    info!(%pid, %disposition, terminated, "Worker terminated");

    let mut histogram = None;
    if disposition.is_normal() {
        match table.claim_channel(pid) {
            Some((id, input, mut reader)) => {
                if let Some(received) = reader.read_result()? {
                    let path = report::write_report(output_dir, pid, &received)?;
                    info!(
                        %pid,
                        worker = id.index(),
                        input = %input,
                        path = %path.display(),
                        letters = received.total(),
                        "Result persisted"
                    );
                    histogram = Some(received);
                } else {
                    debug!(
                        %pid,
                        worker = id.index(),
                        input = %input,
                        "Worker terminated without transmitting a result"
                    );
                }
                // reader drops here, closing the read end
            }
            None => warn!(%pid, "No registered channel for terminated process"),
        }
    }

    // A dropped receiver means the supervisor already bailed; keep draining.
    let _ = events.send(CompletionRecord {
        pid,
        disposition,
        histogram,
    });
    Ok(())
}
