//! Worker subprocess spawning.
//!
//! Re-enters the current executable in hidden worker mode via
//! `std::process::Command`, with the channel write end wired up as the
//! child's stdout.

use std::process::{Command, Stdio};

use nix::unistd::Pid;

use crate::error::{ParhistError, Result};
use super::channel::ChannelWriter;
use super::registry::{INTERRUPT_TOKEN, WorkerInput};

/// Per-run options forwarded to every worker.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Stagger sleep applied by every worker after transmitting (ms).
    pub stagger_base_ms: u64,
    /// Additional stagger sleep per worker index (ms).
    pub stagger_step_ms: u64,
    /// How long a "SIG" worker waits for its interrupt before giving up (ms).
    pub sig_timeout_ms: u64,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            stagger_base_ms: 250,
            stagger_step_ms: 100,
            sig_timeout_ms: 10_000,
        }
    }
}

/// Spawn one worker bound to its channel write end.
///
/// The write end is consumed here; the parent's copy is closed by the
/// spawn machinery, leaving the child as its only holder. The caller keeps
/// the read end. The returned pid is reaped by the completion notifier,
/// so no `Child` handle is retained.
pub fn spawn_worker(
    index: usize,
    input: &WorkerInput,
    writer: ChannelWriter,
    options: &WorkerOptions,
) -> Result<Pid> {
    let exe = std::env::current_exe()
        .map_err(|e| ParhistError::Worker(format!("Failed to get current executable: {}", e)))?;

    let arg = match input {
        WorkerInput::File(path) => path.as_os_str().to_os_string(),
        WorkerInput::Interrupt => INTERRUPT_TOKEN.into(),
    };

    let mut cmd = Command::new(&exe);
    cmd.arg("--internal-worker")
        .arg("--worker-index")
        .arg(index.to_string())
        .arg("--stagger-base-ms")
        .arg(options.stagger_base_ms.to_string())
        .arg("--stagger-step-ms")
        .arg(options.stagger_step_ms.to_string())
        .arg("--sig-timeout-ms")
        .arg(options.sig_timeout_ms.to_string())
        .arg("--")
        .arg(&arg);

    cmd.stdin(Stdio::null());
    cmd.stdout(writer.into_stdio());
    cmd.stderr(Stdio::inherit()); // worker logs go to the supervisor's stderr

    let child = cmd
        .spawn()
        .map_err(|e| ParhistError::Worker(format!("Failed to spawn worker: {}", e)))?;

    Ok(Pid::from_raw(child.id() as i32))
}
