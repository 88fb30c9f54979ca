//! Job scheduling subsystem
//!
//! The system is built around four components:
//! - `JobRegistry`: the named, tagged recurring jobs and their next run times
//! - `JobScheduler`: runs due jobs and reconciles the daily refresh times
//! - `JobExecutor`: performs the artifact refreshes and contains their failures
//! - `ControlLoop`: startup grace, the tick, and shutdown

pub mod job_executor;
pub mod job_registry;
pub mod job_runner;
pub mod job_scheduler;
pub mod types;

pub use job_executor::{JobExecutor, JobStatus};
pub use job_registry::JobRegistry;
pub use job_runner::ControlLoop;
pub use job_scheduler::{JobScheduler, ReconcileOutcome};
pub use types::*;
