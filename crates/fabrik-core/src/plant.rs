//! The plant: every pool, every system, and the queue they report to.
//!
//! A `Plant` is built once at setup and then either stepped headlessly (one
//! [`System::cycle`] per system per step) or handed to a runtime that moves
//! each system onto its own thread. Systems are wired to pools by id at add
//! time; dangling references are construction errors, not runtime ones.

use std::sync::Arc;
use std::time::Duration;

use slotmap::SlotMap;

use crate::event::EventQueue;
use crate::id::{ResourceId, SystemId};
use crate::resource::{Resource, ResourceAmount};
use crate::system::{Pacer, StatusCell, System, SystemStatus};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while wiring a plant together.
#[derive(Debug, thiserror::Error)]
pub enum PlantError {
    #[error("unknown resource id: {0:?}")]
    UnknownResource(ResourceId),
}

// ---------------------------------------------------------------------------
// System specification
// ---------------------------------------------------------------------------

/// One side of a system's conversion, referred to by pool id.
#[derive(Debug, Clone, Copy)]
pub struct Draw {
    pub resource: ResourceId,
    pub amount: u32,
}

/// Everything needed to add a system to the plant.
#[derive(Debug, Clone)]
pub struct SystemSpec {
    pub name: String,
    /// `None` for raw producers that consume nothing.
    pub consumed: Option<Draw>,
    /// `None` for pure sinks that produce nothing.
    pub produced: Option<Draw>,
    pub processing_time: Duration,
}

// ---------------------------------------------------------------------------
// Plant
// ---------------------------------------------------------------------------

/// Registry slot for a system. The `System` itself moves out to a worker
/// while it runs; the slot keeps the name and status handle for lookups and
/// control in the meantime.
#[derive(Debug)]
struct Seat {
    name: String,
    status: Arc<StatusCell>,
    system: Option<System>,
}

/// Owns the resource pools, the systems, and the shared event queue.
#[derive(Debug, Default)]
pub struct Plant {
    resources: SlotMap<ResourceId, Arc<Resource>>,
    systems: SlotMap<SystemId, Seat>,
    events: Arc<EventQueue>,
}

impl Plant {
    pub fn new() -> Self {
        Self::default()
    }

    // -- construction -------------------------------------------------------

    /// Register a pool holding `initial` units under `capacity`.
    pub fn add_resource(
        &mut self,
        name: impl Into<String>,
        initial: u32,
        capacity: u32,
    ) -> ResourceId {
        let name = name.into();
        self.resources
            .insert_with_key(|id| Arc::new(Resource::new(id, name, initial, capacity)))
    }

    /// Register a system, resolving its pool references.
    pub fn add_system(&mut self, spec: SystemSpec) -> Result<SystemId, PlantError> {
        let consumed = self.resolve(spec.consumed)?;
        let produced = self.resolve(spec.produced)?;
        let events = Arc::clone(&self.events);
        Ok(self.systems.insert_with_key(|id| {
            let system = System::new(id, spec.name.clone(), consumed, produced, spec.processing_time, events);
            Seat {
                name: spec.name,
                status: system.status_cell(),
                system: Some(system),
            }
        }))
    }

    fn resolve(&self, draw: Option<Draw>) -> Result<ResourceAmount, PlantError> {
        match draw {
            None => Ok(ResourceAmount::none()),
            Some(draw) => {
                let pool = self
                    .resources
                    .get(draw.resource)
                    .ok_or(PlantError::UnknownResource(draw.resource))?;
                Ok(ResourceAmount::new(Arc::clone(pool), draw.amount))
            }
        }
    }

    // -- lookups ------------------------------------------------------------

    pub fn resource(&self, id: ResourceId) -> Option<&Arc<Resource>> {
        self.resources.get(id)
    }

    pub fn resource_level(&self, id: ResourceId) -> Option<u32> {
        self.resources.get(id).map(|pool| pool.level())
    }

    pub fn resource_name(&self, id: ResourceId) -> Option<&str> {
        self.resources.get(id).map(|pool| pool.name())
    }

    pub fn resources(&self) -> impl Iterator<Item = &Arc<Resource>> {
        self.resources.values()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// The system, if it is currently seated (not moved out to a worker).
    pub fn system(&self, id: SystemId) -> Option<&System> {
        self.systems.get(id).and_then(|seat| seat.system.as_ref())
    }

    pub fn system_mut(&mut self, id: SystemId) -> Option<&mut System> {
        self.systems.get_mut(id).and_then(|seat| seat.system.as_mut())
    }

    /// The system's name; available whether or not the system is seated.
    pub fn system_name(&self, id: SystemId) -> Option<&str> {
        self.systems.get(id).map(|seat| seat.name.as_str())
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Iterate `(id, name)` over every registered system, seated or not.
    pub fn systems(&self) -> impl Iterator<Item = (SystemId, &str)> {
        self.systems.iter().map(|(id, seat)| (id, seat.name.as_str()))
    }

    /// Shared handle to the event queue.
    pub fn events(&self) -> Arc<EventQueue> {
        Arc::clone(&self.events)
    }

    // -- control ------------------------------------------------------------

    /// Set a system's run status. Works whether the system is seated or out
    /// on a worker; the cell is shared. Returns false for an unknown id.
    pub fn set_status(&self, id: SystemId, status: SystemStatus) -> bool {
        match self.systems.get(id) {
            Some(seat) => {
                seat.status.store(status);
                true
            }
            None => false,
        }
    }

    /// A system's current run status.
    pub fn status(&self, id: SystemId) -> Option<SystemStatus> {
        self.systems.get(id).map(|seat| seat.status.load())
    }

    // -- headless stepping --------------------------------------------------

    /// Run one cycle of every seated, non-terminated system in insertion
    /// order. The synchronous counterpart of a thread-per-system runtime.
    pub fn step(&mut self, pacer: &impl Pacer) {
        for seat in self.systems.values_mut() {
            if let Some(system) = seat.system.as_mut()
                && system.status() != SystemStatus::Terminate
            {
                system.cycle(pacer);
            }
        }
    }

    // -- worker hand-off ----------------------------------------------------

    /// Move every seated system out, leaving its seat behind for name and
    /// status lookups. Used by runtimes to fan systems out onto threads.
    pub fn take_systems(&mut self) -> Vec<System> {
        self.systems
            .values_mut()
            .filter_map(|seat| seat.system.take())
            .collect()
    }

    /// Return a worker-returned system to its seat. A system whose seat no
    /// longer exists is dropped.
    pub fn restore(&mut self, system: System) {
        if let Some(seat) = self.systems.get_mut(system.id()) {
            seat.system = Some(system);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
