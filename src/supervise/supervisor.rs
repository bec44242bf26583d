//! Run orchestration: spawn every worker, interrupt the ones that asked
//! for it, and wait for all of them to terminate.

use std::path::PathBuf;
use std::sync::Arc;

use nix::sys::signal::{self, Signal};
use tracing::{debug, info, warn};

use crate::error::{ParhistError, Result};
use super::channel;
use super::reaper::Notifier;
use super::registry::{WorkerInput, WorkerTable};
use super::spawn::{self, WorkerOptions};

/// Upper bound on workers per run.
pub const MAX_WORKERS: usize = 100;

/// Configuration for one supervised run.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Directory receiving one report file per successful worker.
    pub output_dir: PathBuf,
    /// Options forwarded to every worker.
    pub worker_options: WorkerOptions,
}

/// Outcome of a completed run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub spawned: usize,
    /// Workers that exited with code 0.
    pub succeeded: usize,
    /// Workers whose histogram was received and persisted.
    pub persisted: usize,
    /// Workers terminated by a signal.
    pub interrupted: usize,
}

/// Validate the worker count before any process is created.
fn validate_inputs(inputs: &[String]) -> Result<()> {
    if inputs.is_empty() {
        return Err(ParhistError::Config("no input files provided".to_string()));
    }
    if inputs.len() > MAX_WORKERS {
        return Err(ParhistError::Config(format!(
            "too many input files: {} (maximum {})",
            inputs.len(),
            MAX_WORKERS
        )));
    }
    Ok(())
}

/// Run the full supervise-and-collect cycle for the given inputs.
///
/// There is no deadline: a worker that never terminates blocks the run
/// forever.
pub fn run(inputs: &[String], config: &SupervisorConfig) -> Result<RunSummary> {
    validate_inputs(inputs)?;
    std::fs::create_dir_all(&config.output_dir)?;

    let table = Arc::new(WorkerTable::new());

    // Armed before the first spawn so no termination can go unnoticed.
    let notifier = Notifier::arm(table.clone(), inputs.len(), config.output_dir.clone());

    for (index, raw) in inputs.iter().enumerate() {
        let input = WorkerInput::parse(raw);
        let (reader, writer) = channel::result_channel()?;
        let id = table.register(input.clone(), reader);
        let pid = spawn::spawn_worker(index, &input, writer, &config.worker_options)?;
        table.record_spawn(id, pid);
        info!(worker = index, %pid, input = %input, "Worker spawned");

        if input.is_interrupt() {
            // Deliberately races the worker's own wait; the interrupt may
            // land before, during, or after the worker's setup.
            match signal::kill(pid, Signal::SIGINT) {
                Ok(()) => debug!(%pid, "Interrupt sent to worker"),
                Err(e) => warn!(%pid, error = %e, "Interrupt not delivered"),
            }
        }
    }

    let mut summary = RunSummary {
        spawned: table.spawned(),
        ..Default::default()
    };

    // terminated == spawned is the sole exit condition; one completion
    // record arrives per termination, increment before send.
    let mut received = 0;
    while received < summary.spawned || table.terminated() < table.spawned() {
        let record = notifier.recv()?;
        received += 1;
        if record.disposition.is_success() {
            summary.succeeded += 1;
        }
        if record.disposition.is_interrupted() {
            summary.interrupted += 1;
        }
        if record.histogram.is_some() {
            summary.persisted += 1;
        }
    }

    notifier.join()?;
    info!(
        spawned = summary.spawned,
        succeeded = summary.succeeded,
        persisted = summary.persisted,
        interrupted = summary.interrupted,
        "All workers terminated"
    );
    Ok(summary)
}
