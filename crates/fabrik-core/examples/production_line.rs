//! Minimal production line: mine -> smelter -> market, stepped headlessly.
//!
//! Builds a three-system chain over two pools and runs 10 synchronous
//! steps, printing pool levels and any queued reports after each one.
//!
//! Run with: `cargo run -p fabrik-core --example production_line`

use std::time::Duration;

use fabrik_core::plant::{Draw, Plant, SystemSpec};
use fabrik_core::system::InstantPacer;

fn main() {
    let mut plant = Plant::new();

    // Two pools: ore is plentiful, plate storage is tight so the smelter
    // will eventually feel backpressure.
    let ore = plant.add_resource("ore", 0, 100);
    let plates = plant.add_resource("plates", 0, 6);

    plant
        .add_system(SystemSpec {
            name: "mine".into(),
            consumed: None,
            produced: Some(Draw { resource: ore, amount: 5 }),
            processing_time: Duration::ZERO,
        })
        .expect("ore pool exists");

    plant
        .add_system(SystemSpec {
            name: "smelter".into(),
            consumed: Some(Draw { resource: ore, amount: 2 }),
            produced: Some(Draw { resource: plates, amount: 2 }),
            processing_time: Duration::ZERO,
        })
        .expect("both pools exist");

    // The market only clears one plate per step, half of what the smelter
    // makes; plates saturate and the smelter starts reporting.
    plant
        .add_system(SystemSpec {
            name: "market".into(),
            consumed: Some(Draw { resource: plates, amount: 1 }),
            produced: None,
            processing_time: Duration::ZERO,
        })
        .expect("plate pool exists");

    let events = plant.events();
    for step in 1..=10 {
        plant.step(&InstantPacer);

        println!(
            "step {step:2}: ore={:3}  plates={:2}",
            plant.resource_level(ore).unwrap(),
            plant.resource_level(plates).unwrap(),
        );
        for event in events.drain() {
            println!(
                "         report: {} on '{}' at level {} ({:?} priority)",
                match event.status {
                    fabrik_core::resource::Status::Ok => "ok",
                    fabrik_core::resource::Status::Empty => "supply empty",
                    fabrik_core::resource::Status::Insufficient => "supply short",
                    fabrik_core::resource::Status::Capacity => "capacity full",
                },
                plant.resource_name(event.resource).unwrap_or("?"),
                event.amount,
                event.priority,
            );
        }
    }
}
