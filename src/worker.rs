//! Worker subprocess entry point.
//!
//! This module runs when the binary is re-entered with `--internal-worker`.
//! The result channel write end is inherited as stdout, so all diagnostics
//! go to stderr. A worker never retries: the first failure terminates it
//! with exit code 1, and the supervisor simply finds its channel empty.

use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::error::{ParhistError, Result};
use crate::histogram::Histogram;
use crate::supervise::{ChannelWriter, WorkerInput, WorkerOptions};

/// Everything a worker needs, decoded from its hidden CLI flags.
#[derive(Debug)]
pub struct WorkerContext {
    /// Position of this worker in the spawn order.
    pub index: usize,
    pub input: WorkerInput,
    pub options: WorkerOptions,
}

/// Run the worker and terminate the process.
pub fn run_worker_main(ctx: WorkerContext) -> ! {
    // Report broken pipes through io errors, not process death.
    unsafe {
        nix::sys::signal::signal(
            nix::sys::signal::Signal::SIGPIPE,
            nix::sys::signal::SigHandler::SigIgn,
        )
        .ok();
    }

    match worker_body(&ctx) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            error!(worker = ctx.index, error = %e, "Worker failed");
            std::process::exit(1);
        }
    }
}

fn worker_body(ctx: &WorkerContext) -> Result<()> {
    match &ctx.input {
        WorkerInput::Interrupt => wait_for_interrupt(ctx),
        WorkerInput::File(path) => histogram_file(ctx, path),
    }
}

/// Idle until the supervisor's SIGINT arrives or the timeout elapses.
///
/// SIGINT keeps its default disposition, so the interrupt terminates this
/// process abnormally; surviving the full wait is a normal exit.
fn wait_for_interrupt(ctx: &WorkerContext) -> Result<()> {
    info!(worker = ctx.index, "Waiting for interrupt");
    thread::sleep(Duration::from_millis(ctx.options.sig_timeout_ms));
    info!(worker = ctx.index, "No interrupt arrived before the timeout");
    Ok(())
}

/// Load the assigned file, transmit its histogram, stagger, exit.
fn histogram_file(ctx: &WorkerContext, path: &Path) -> Result<()> {
    debug!(worker = ctx.index, path = %path.display(), "Loading input");
    let data = std::fs::read(path)
        .map_err(|e| ParhistError::Worker(format!("Failed to read {}: {}", path.display(), e)))?;

    let histogram = Histogram::of_bytes(&data);
    info!(
        worker = ctx.index,
        bytes = data.len(),
        letters = histogram.total(),
        "Histogram computed"
    );

    // Safety: fd 1 is the channel write end wired up by the supervisor.
    let mut writer = unsafe { ChannelWriter::from_raw(1) };
    writer.send(&histogram)?;
    drop(writer); // close the write end before the stagger sleep

    let stagger = Duration::from_millis(
        ctx.options.stagger_base_ms + ctx.options.stagger_step_ms * ctx.index as u64,
    );
    debug!(
        worker = ctx.index,
        stagger_ms = stagger.as_millis() as u64,
        "Staggering before exit"
    );
    thread::sleep(stagger);
    Ok(())
}
