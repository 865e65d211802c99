//! Top-level error type. Every variant ends the process with exit code 1.

use crate::compile::CompileError;
use crate::config::ConfigError;
use crate::job::JobError;
use crate::scheduler::SchedulerError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Failed to set up Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
