//! The per-system conversion and storage state machine.
//!
//! A system repeatedly withdraws from its input pool, pauses for its
//! status-scaled processing time, stages the produced units locally, and
//! flushes the stage into its output pool. Shortfalls and capacity pressure
//! are not errors: they are reported on the event queue and retried after a
//! fixed backoff, forever -- the economy is long-running and self-corrects.
//!
//! The state machine never spawns threads itself. A runtime drives
//! [`System::cycle`] in a loop and supplies a [`Pacer`] for the pauses, so
//! the same code runs against wall-clock time or headlessly in tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use crate::event::{Event, EventQueue, Priority};
use crate::id::SystemId;
use crate::resource::{ResourceAmount, Status};

/// Fixed pause after any reported failure before the next attempt. There is
/// no exponential backoff and no retry cap.
pub const BACKOFF_QUANTUM: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// Run status
// ---------------------------------------------------------------------------

/// Externally-settable run status of a system.
///
/// `Slow`/`Fast` scale the processing time; `Terminate` asks the owning
/// worker to exit its loop. Terminal: nothing transitions out of
/// `Terminate`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize,
)]
pub enum SystemStatus {
    #[default]
    Standard,
    /// Processing takes twice the nominal time.
    Slow,
    /// Processing takes half the nominal time.
    Fast,
    /// The worker loop must exit before its next cycle.
    Terminate,
}

fn encode(status: SystemStatus) -> u8 {
    match status {
        SystemStatus::Standard => 0,
        SystemStatus::Slow => 1,
        SystemStatus::Fast => 2,
        SystemStatus::Terminate => 3,
    }
}

fn decode(bits: u8) -> SystemStatus {
    match bits {
        0 => SystemStatus::Standard,
        1 => SystemStatus::Slow,
        2 => SystemStatus::Fast,
        _ => SystemStatus::Terminate,
    }
}

/// Shared cell holding a [`SystemStatus`].
///
/// The one field of a running system that anything outside its worker may
/// write. The worker reads it at least once per cycle with an acquire load;
/// controllers publish with a release store. No lock involved.
#[derive(Debug, Default)]
pub struct StatusCell {
    bits: AtomicU8,
}

impl StatusCell {
    pub fn new(status: SystemStatus) -> Self {
        Self {
            bits: AtomicU8::new(encode(status)),
        }
    }

    pub fn load(&self) -> SystemStatus {
        decode(self.bits.load(Ordering::Acquire))
    }

    pub fn store(&self, status: SystemStatus) {
        self.bits.store(encode(status), Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Pacer
// ---------------------------------------------------------------------------

/// How a system waits. Processing pauses and failure backoff both go
/// through this seam, which is the only place the state machine touches
/// time.
pub trait Pacer {
    fn pause(&self, duration: Duration);
}

/// Suspends the calling thread for real. The pacer runtime workers use.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Completes every pause immediately. For headless stepping and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantPacer;

impl Pacer for InstantPacer {
    fn pause(&self, _duration: Duration) {}
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// An autonomous production unit: converts a consumed resource into a
/// produced resource on a timed cycle, reporting outcomes on the shared
/// queue.
#[derive(Debug)]
pub struct System {
    id: SystemId,
    name: String,
    consumed: ResourceAmount,
    produced: ResourceAmount,
    processing_time: Duration,
    status: Arc<StatusCell>,
    /// Produced units staged locally until the output pool has room.
    /// Single-writer: only the worker that owns this `System` touches it.
    amount_stored: u32,
    events: Arc<EventQueue>,
}

impl System {
    pub fn new(
        id: SystemId,
        name: impl Into<String>,
        consumed: ResourceAmount,
        produced: ResourceAmount,
        processing_time: Duration,
        events: Arc<EventQueue>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            consumed,
            produced,
            processing_time,
            status: Arc::new(StatusCell::default()),
            amount_stored: 0,
            events,
        }
    }

    pub fn id(&self) -> SystemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units currently staged for the output pool (the backpressure buffer).
    pub fn amount_stored(&self) -> u32 {
        self.amount_stored
    }

    /// Current run status (acquire load).
    pub fn status(&self) -> SystemStatus {
        self.status.load()
    }

    /// Handle to the shared status cell, for controllers that outlive the
    /// move of this system into its worker.
    pub fn status_cell(&self) -> Arc<StatusCell> {
        Arc::clone(&self.status)
    }

    /// Run one cycle of the state machine.
    ///
    /// Converts when the stage is empty, then flushes the stage if it holds
    /// anything -- the flush runs every cycle regardless of how conversion
    /// went, so a saturated output drains as soon as space frees up. All
    /// waiting goes through `pacer`.
    pub fn cycle(&mut self, pacer: &impl Pacer) {
        if self.amount_stored == 0 {
            let status = self.convert(pacer);
            if status != Status::Ok {
                self.report_shortage(status);
                pacer.pause(BACKOFF_QUANTUM);
            }
        }

        if self.amount_stored > 0 && self.flush() != Status::Ok {
            self.report_capacity();
            pacer.pause(BACKOFF_QUANTUM);
        }
    }

    /// Withdraw the input, simulate the work, stage the output.
    fn convert(&mut self, pacer: &impl Pacer) -> Status {
        let status = match &self.consumed.resource {
            // A system with no input is a raw producer; conversion always
            // succeeds.
            None => Status::Ok,
            Some(pool) => pool.consume(self.consumed.amount),
        };

        if status == Status::Ok {
            pacer.pause(self.effective_processing_time());
            match &self.produced.resource {
                Some(_) => self.amount_stored += self.produced.amount,
                // Pure sink: consumed units leave the economy.
                None => self.amount_stored = 0,
            }
        }
        status
    }

    /// Move staged units into the output pool as far as capacity allows.
    /// Whatever does not fit stays staged for the next cycle.
    fn flush(&mut self) -> Status {
        let Some(pool) = &self.produced.resource else {
            self.amount_stored = 0;
            return Status::Ok;
        };

        let absorption = pool.produce(self.amount_stored);
        self.amount_stored = absorption.leftover;
        if absorption.leftover > 0 {
            Status::Capacity
        } else {
            Status::Ok
        }
    }

    /// Nominal processing time scaled by the current status modifier.
    fn effective_processing_time(&self) -> Duration {
        match self.status.load() {
            SystemStatus::Slow => self.processing_time * 2,
            SystemStatus::Fast => self.processing_time / 2,
            SystemStatus::Standard | SystemStatus::Terminate => self.processing_time,
        }
    }

    fn report_shortage(&self, status: Status) {
        // Conversion can only fail when an input pool is present.
        let Some(pool) = &self.consumed.resource else {
            return;
        };
        self.events.push(Event {
            system: self.id,
            resource: pool.id(),
            status,
            priority: Priority::High,
            amount: pool.level(),
        });
    }

    fn report_capacity(&self) {
        let Some(pool) = &self.produced.resource else {
            return;
        };
        self.events.push(Event {
            system: self.id,
            resource: pool.id(),
            status: Status::Capacity,
            priority: Priority::Low,
            amount: pool.level(),
        });
    }
}

// ===========================================================================
// Tests
// ===========================================================================
