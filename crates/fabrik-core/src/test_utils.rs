//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so the same
//! builders are available everywhere, including dependent crates' tests via
//! the `test-utils` feature.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use slotmap::SlotMap;

use crate::event::{Event, EventQueue, Priority};
use crate::id::{ResourceId, SystemId};
use crate::plant::{Draw, Plant, SystemSpec};
use crate::resource::{Resource, ResourceAmount, Status};
use crate::system::{Pacer, System};

// ===========================================================================
// Id minting
// ===========================================================================

/// A fresh, valid `ResourceId` detached from any plant.
pub fn resource_id() -> ResourceId {
    let mut sm = SlotMap::<ResourceId, ()>::with_key();
    sm.insert(())
}

/// A fresh, valid `SystemId` detached from any plant.
pub fn system_id() -> SystemId {
    let mut sm = SlotMap::<SystemId, ()>::with_key();
    sm.insert(())
}

// ===========================================================================
// Builders
// ===========================================================================

/// A standalone pool, not registered with any plant.
pub fn pool(name: &str, initial: u32, capacity: u32) -> Arc<Resource> {
    Arc::new(Resource::new(resource_id(), name, initial, capacity))
}

/// A fresh shared event queue.
pub fn queue() -> Arc<EventQueue> {
    Arc::new(EventQueue::new())
}

/// A standalone system, not registered with any plant.
pub fn system(
    name: &str,
    consumed: ResourceAmount,
    produced: ResourceAmount,
    processing_time: Duration,
    events: Arc<EventQueue>,
) -> System {
    System::new(system_id(), name, consumed, produced, processing_time, events)
}

/// An event with the given priority and a distinguishing amount; the other
/// fields are placeholders for queue-only tests.
pub fn report(priority: Priority, amount: u32) -> Event {
    Event {
        system: system_id(),
        resource: resource_id(),
        status: Status::Ok,
        priority,
        amount,
    }
}

/// A three-stage chain: mine -> ore -> smelter -> plates -> market.
///
/// All processing times are zero so the plant can be stepped or run at full
/// speed. Returns the plant and the two pool ids.
pub fn chain_plant(ore_capacity: u32, plate_capacity: u32) -> (Plant, ResourceId, ResourceId) {
    let mut plant = Plant::new();
    let ore = plant.add_resource("ore", 0, ore_capacity);
    let plates = plant.add_resource("plates", 0, plate_capacity);

    plant
        .add_system(SystemSpec {
            name: "mine".into(),
            consumed: None,
            produced: Some(Draw { resource: ore, amount: 4 }),
            processing_time: Duration::ZERO,
        })
        .expect("ore pool exists");
    plant
        .add_system(SystemSpec {
            name: "smelter".into(),
            consumed: Some(Draw { resource: ore, amount: 2 }),
            produced: Some(Draw { resource: plates, amount: 1 }),
            processing_time: Duration::ZERO,
        })
        .expect("both pools exist");
    plant
        .add_system(SystemSpec {
            name: "market".into(),
            consumed: Some(Draw { resource: plates, amount: 1 }),
            produced: None,
            processing_time: Duration::ZERO,
        })
        .expect("plate pool exists");

    (plant, ore, plates)
}

// ===========================================================================
// RecordingPacer
// ===========================================================================

/// Captures every requested pause instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    /// Every pause requested so far, in order.
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().clone()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, duration: Duration) {
        self.pauses.lock().push(duration);
    }
}
