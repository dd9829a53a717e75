//! Capacity-bounded resource pools shared between systems.
//!
//! Each [`Resource`] owns its own lock, so systems touching unrelated pools
//! never contend. All mutation goes through [`Resource::consume`] and
//! [`Resource::produce`]; there is no way to read-modify-write a level from
//! outside the critical section.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::id::ResourceId;

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

/// Outcome codes for pool operations, carried on events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Status {
    /// The operation completed in full.
    Ok,
    /// Consumption failed: the pool is at zero.
    Empty,
    /// Consumption failed: the pool holds less than requested.
    Insufficient,
    /// Production was not fully absorbed: the pool hit its capacity.
    Capacity,
}

/// How much of a [`Resource::produce`] call the pool absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "leftover indicates units that did not fit and must stay staged"]
pub struct Absorption {
    /// Units added to the pool.
    pub absorbed: u32,
    /// Units that did not fit under the capacity.
    pub leftover: u32,
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// A named, capacity-bounded counter shared by many systems.
///
/// The level is only reachable through `consume`/`produce`/`level`, each of
/// which takes the pool's own mutex for the duration of the access.
#[derive(Debug)]
pub struct Resource {
    id: ResourceId,
    name: String,
    max_capacity: u32,
    level: Mutex<u32>,
}

impl Resource {
    /// Create a pool holding `initial` units under `max_capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `initial` exceeds `max_capacity`. A malformed pool is a
    /// setup error the simulation cannot run with; external scenario data is
    /// validated before it reaches this constructor.
    pub fn new(id: ResourceId, name: impl Into<String>, initial: u32, max_capacity: u32) -> Self {
        assert!(
            initial <= max_capacity,
            "initial level {initial} exceeds capacity {max_capacity}"
        );
        Self {
            id,
            name: name.into(),
            max_capacity,
            level: Mutex::new(initial),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    /// Current level, read under the lock. Possibly stale by the time the
    /// caller looks at it if other systems are active.
    pub fn level(&self) -> u32 {
        *self.level.lock()
    }

    /// Atomically withdraw `quantity` units.
    ///
    /// Returns [`Status::Empty`] when the pool is at zero and
    /// [`Status::Insufficient`] when it holds something, but less than
    /// requested. Neither failure mutates the pool.
    pub fn consume(&self, quantity: u32) -> Status {
        let mut level = self.level.lock();
        if *level >= quantity {
            *level -= quantity;
            Status::Ok
        } else if *level == 0 {
            Status::Empty
        } else {
            Status::Insufficient
        }
    }

    /// Atomically deposit up to `quantity` units, bounded by the capacity.
    ///
    /// Never fails; a pool at capacity absorbs zero and reports the whole
    /// quantity as leftover.
    pub fn produce(&self, quantity: u32) -> Absorption {
        let mut level = self.level.lock();
        let space = self.max_capacity - *level;
        let absorbed = quantity.min(space);
        *level += absorbed;
        Absorption {
            absorbed,
            leftover: quantity - absorbed,
        }
    }
}

// ---------------------------------------------------------------------------
// ResourceAmount
// ---------------------------------------------------------------------------

/// How much of which pool a system touches per cycle. Immutable after the
/// system is built.
///
/// `resource: None` models the ends of a chain: a raw producer consumes
/// nothing, a pure sink produces into nothing.
#[derive(Debug, Clone)]
pub struct ResourceAmount {
    pub resource: Option<Arc<Resource>>,
    pub amount: u32,
}

impl ResourceAmount {
    pub fn new(resource: Arc<Resource>, amount: u32) -> Self {
        Self {
            resource: Some(resource),
            amount,
        }
    }

    /// No pool involved on this side of the conversion.
    pub fn none() -> Self {
        Self {
            resource: None,
            amount: 0,
        }
    }
}
