//! Process-level orchestration of histogram workers.
//!
//! The supervisor spawns one subprocess per input, each wired to a private
//! result channel. A dedicated notifier thread reaps terminations as they
//! happen, drains the terminated worker's channel, persists its report,
//! and posts a completion record back to the supervisor, which blocks
//! until every worker is accounted for.
//!
//! # Architecture
//!
//! ```text
//!              ┌──────────────────┐          ┌──────────────────┐
//!              │    Supervisor    │ records  │     Notifier     │
//!              │  (main thread)   │◀─────────│  (reaper thread) │
//!              └────────┬─────────┘          └───▲──────────▲───┘
//!                       │ spawn                  │ waitpid  │ read
//!            ┌──────────┼──────────┐             │          │
//!      ┌─────▼─────┐        ┌─────▼─────┐        │          │
//!      │ Worker 0  │  ...   │ Worker N  │────────┘          │
//!      │ (process) │        │ (process) │   result pipes    │
//!      └─────┬─────┘        └─────┬─────┘                   │
//!            └────────────────────┴─────────────────────────┘
//! ```

mod channel;
mod disposition;
mod reaper;
mod registry;
mod spawn;
mod supervisor;

pub use channel::ChannelWriter;
pub use registry::WorkerInput;
pub use spawn::WorkerOptions;
pub use supervisor::{RunSummary, SupervisorConfig, run};
