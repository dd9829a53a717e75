//! The simulation driver.
//!
//! Owns the plant, fans its systems out onto workers, consumes the shared
//! event queue, and shuts everything down cooperatively: request terminate
//! on every status cell, join every thread, drain what is left in the
//! queue.

use fabrik_core::event::Event;
use fabrik_core::id::{ResourceId, SystemId};
use fabrik_core::plant::Plant;
use fabrik_core::system::SystemStatus;

use crate::worker::{self, WorkerError, WorkerHandle};

/// Errors from starting or stopping the worker fleet.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// Drives a plant: one worker per system, one consumer of the event queue.
#[derive(Debug)]
pub struct Supervisor {
    plant: Plant,
    workers: Vec<WorkerHandle>,
}

impl Supervisor {
    pub fn new(plant: Plant) -> Self {
        Self {
            plant,
            workers: Vec::new(),
        }
    }

    // -- lifecycle ----------------------------------------------------------

    /// Start one worker per seated system.
    ///
    /// If any spawn fails, the workers that did start are terminated and
    /// joined before the error is returned. Calling `start` while already
    /// running finds no seated systems and spawns nothing.
    pub fn start(&mut self) -> Result<(), SupervisorError> {
        let mut failed: Option<std::io::Error> = None;
        for system in self.plant.take_systems() {
            if failed.is_some() {
                // A spawn already failed; put the rest back in their seats.
                self.plant.restore(system);
                continue;
            }
            match worker::spawn(system) {
                Ok(handle) => self.workers.push(handle),
                Err(error) => failed = Some(error),
            }
        }
        if let Some(error) = failed {
            log::error!("spawn failed, stopping partial fleet: {error}");
            let _ = self.shutdown();
            return Err(SupervisorError::Spawn(error));
        }
        log::info!("supervisor started {} workers", self.workers.len());
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Terminate every worker, join them all, then drain and clear the
    /// queue. Idempotent: with no running workers this only clears the
    /// queue. A panicked worker surfaces as an error after all others have
    /// been joined and reseated.
    pub fn shutdown(&mut self) -> Result<(), SupervisorError> {
        for handle in &self.workers {
            handle.request_terminate();
        }

        let mut lost: Option<WorkerError> = None;
        for handle in self.workers.drain(..) {
            let name = handle.name().to_string();
            match handle.join() {
                Ok(system) => {
                    log::debug!("worker '{name}' joined");
                    self.plant.restore(system);
                }
                Err(error) => {
                    log::error!("worker '{name}' lost: {error}");
                    lost.get_or_insert(error);
                }
            }
        }

        let leftovers = self.drain_events();
        if !leftovers.is_empty() {
            log::debug!("drained {} events at shutdown", leftovers.len());
        }
        self.plant.events().clear();

        match lost {
            None => Ok(()),
            Some(error) => Err(error.into()),
        }
    }

    /// Recover the plant, shutting down first if needed. Every surviving
    /// system is back in its seat afterwards.
    pub fn into_plant(mut self) -> Plant {
        if let Err(error) = self.shutdown() {
            log::error!("teardown lost a worker: {error}");
        }
        std::mem::take(&mut self.plant)
    }

    // -- observation --------------------------------------------------------

    pub fn plant(&self) -> &Plant {
        &self.plant
    }

    pub fn resource_level(&self, id: ResourceId) -> Option<u32> {
        self.plant.resource_level(id)
    }

    pub fn system_name(&self, id: SystemId) -> Option<&str> {
        self.plant.system_name(id)
    }

    pub fn queue_len(&self) -> usize {
        self.plant.events().len()
    }

    /// Pop every queued event in priority order, logging each with resolved
    /// names.
    pub fn drain_events(&self) -> Vec<Event> {
        let events = self.plant.events().drain();
        for event in &events {
            log::info!(
                "'{}' reported {:?} on '{}' at level {} ({:?})",
                self.system_name(event.system).unwrap_or("?"),
                event.status,
                self.plant.resource_name(event.resource).unwrap_or("?"),
                event.amount,
                event.priority,
            );
        }
        events
    }

    // -- control ------------------------------------------------------------

    /// Publish a run status for one system; observed by its worker on the
    /// next cycle. Returns false for an unknown id.
    pub fn set_status(&self, id: SystemId, status: SystemStatus) -> bool {
        self.plant.set_status(id, status)
    }

    /// Ask one system's worker to exit. Terminal for that system.
    pub fn request_terminate(&self, id: SystemId) -> bool {
        self.plant.set_status(id, SystemStatus::Terminate)
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        // A dropped supervisor must not leak running workers.
        if let Err(error) = self.shutdown() {
            log::error!("shutdown during drop lost a worker: {error}");
        }
    }
}
