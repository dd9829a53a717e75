//! One OS thread per system.
//!
//! The worker loop is the only place a [`System`] runs: read the shared
//! status, exit on `Terminate`, otherwise run one cycle with a real
//! sleeping pacer. Cancellation is cooperative -- a terminate request is
//! observed within at most one in-flight processing pause plus one backoff.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use fabrik_core::id::SystemId;
use fabrik_core::system::{StatusCell, System, SystemStatus, ThreadPacer};

/// Errors surfaced when a worker is joined.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("worker '{name}' panicked")]
    Panicked { name: String },
}

/// Handle to a running system worker.
///
/// Holds the shared status cell, so control works while the `System` itself
/// is owned by the thread. Joining returns the system for inspection or
/// reseating.
#[derive(Debug)]
pub struct WorkerHandle {
    id: SystemId,
    name: String,
    status: Arc<StatusCell>,
    thread: JoinHandle<System>,
}

/// Start `system` on its own named thread.
///
/// Spawn failure is a setup error and is propagated, not swallowed; a plant
/// with half its workers is not worth running.
pub fn spawn(system: System) -> io::Result<WorkerHandle> {
    let id = system.id();
    let name = system.name().to_string();
    let status = system.status_cell();
    let thread = thread::Builder::new()
        .name(format!("system-{name}"))
        .spawn(move || run(system))?;
    Ok(WorkerHandle {
        id,
        name,
        status,
        thread,
    })
}

fn run(mut system: System) -> System {
    log::debug!("worker '{}' started", system.name());
    let pacer = ThreadPacer;
    while system.status() != SystemStatus::Terminate {
        system.cycle(&pacer);
    }
    log::debug!("worker '{}' exiting", system.name());
    system
}

impl WorkerHandle {
    pub fn id(&self) -> SystemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Publish a new run status for the worker to observe on its next
    /// cycle.
    pub fn set_status(&self, status: SystemStatus) {
        self.status.store(status);
    }

    /// Ask the worker to exit its loop. Terminal.
    pub fn request_terminate(&self) {
        self.status.store(SystemStatus::Terminate);
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the worker to exit and recover its system. A panicked
    /// worker becomes an error value instead of propagating the unwind.
    pub fn join(self) -> Result<System, WorkerError> {
        let Self { name, thread, .. } = self;
        thread.join().map_err(|_| WorkerError::Panicked { name })
    }
}
