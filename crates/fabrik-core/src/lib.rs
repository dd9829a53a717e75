//! Fabrik Core -- the simulation engine for small production economies.
//!
//! A plant is a set of capacity-bounded resource pools, a set of autonomous
//! systems converting one pool into another, and a shared priority queue of
//! outcome events.
//!
//! # Cycle
//!
//! Each call to [`system::System::cycle`] runs one round of the conversion
//! state machine:
//!
//! 1. **Convert** -- when nothing is staged, withdraw the consumed amount
//!    from the input pool, pause for the status-scaled processing time, and
//!    stage the produced amount.
//! 2. **Store** -- flush the stage into the output pool as far as capacity
//!    allows; leftover stays staged as the backpressure buffer.
//!
//! Supply shortfalls and capacity pressure are reported as prioritized
//! events and retried after a fixed backoff; nothing in steady state is an
//! error.
//!
//! # Key Types
//!
//! - [`plant::Plant`] -- registry of pools, systems, and the shared queue.
//! - [`resource::Resource`] -- a pool guarded by its own lock; `consume` and
//!   `produce` are its only mutators.
//! - [`event::EventQueue`] -- thread-safe mailbox, HIGH before LOW, newest
//!   first within a band.
//! - [`system::System`] -- the conversion state machine, driven by a worker
//!   thread or stepped headlessly.
//! - [`system::Pacer`] -- the seam through which all waiting happens.
//!
//! The core spawns no threads. `fabrik-runtime` runs one worker per system;
//! [`plant::Plant::step`] drives the same machines synchronously.

pub mod event;
pub mod id;
pub mod plant;
pub mod resource;
pub mod system;

#[cfg(feature = "data-loader")]
pub mod data_loader;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
