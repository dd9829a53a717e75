//! Thread-per-system runtime for fabrik plants.
//!
//! `fabrik-core` defines the machines; this crate runs them. Each system
//! gets one named OS thread that loops its cycle until the shared status
//! cell reads `Terminate`. The [`supervisor::Supervisor`] owns the plant,
//! fans the systems out, consumes the event stream, and shuts everything
//! down cooperatively -- there is no coordinator beyond the initial fan-out
//! and the final join.

pub mod supervisor;
pub mod worker;
