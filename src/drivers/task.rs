//! Named background task spawning.
//!
//! The controller runs exactly two background tasks besides the main
//! loop: the tick source and the sensor sampling task.  Each has a fixed
//! name and stack budget declared here so the whole task layout is
//! visible in one place.

use std::thread::JoinHandle;

use log::{error, info};

use crate::error::SchedulerError;

/// Name and stack budget for one background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: &'static str,
    pub stack_kb: usize,
}

/// Periodic 1 Hz tick source.  Only touches atomics, small stack.
pub const TICK_TASK: TaskSpec = TaskSpec {
    name: "tick",
    stack_kb: 16,
};

/// Blocking sensor transactions.
pub const SAMPLER_TASK: TaskSpec = TaskSpec {
    name: "sampler",
    stack_kb: 32,
};

/// Spawn `f` as a named thread with the task's stack budget.
pub fn spawn_task(
    spec: TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>, SchedulerError> {
    info!("Spawning '{}' (stack={}KB)", spec.name, spec.stack_kb);

    std::thread::Builder::new()
        .name(spec.name.into())
        .stack_size(spec.stack_kb * 1024)
        .spawn(f)
        .map_err(|e| {
            error!("spawn '{}' failed: {}", spec.name, e);
            SchedulerError::SpawnFailed
        })
}
