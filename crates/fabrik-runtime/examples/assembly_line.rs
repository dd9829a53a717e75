//! Threaded assembly line: a scenario file, a supervisor, and half a second
//! of real concurrent production.
//!
//! Run with: `RUST_LOG=info cargo run -p fabrik-runtime --example assembly_line`

use std::thread;
use std::time::Duration;

use fabrik_core::data_loader::plant_from_json;
use fabrik_runtime::supervisor::Supervisor;

const SCENARIO: &str = r#"{
    "resources": [
        {"name": "ore",    "capacity": 40},
        {"name": "plates", "capacity": 12}
    ],
    "systems": [
        {"name": "north-mine", "produces": {"resource": "ore", "amount": 3}, "processing_ms": 15},
        {"name": "south-mine", "produces": {"resource": "ore", "amount": 2}, "processing_ms": 25},
        {
            "name": "smelter",
            "consumes": {"resource": "ore", "amount": 4},
            "produces": {"resource": "plates", "amount": 2},
            "processing_ms": 30
        },
        {"name": "market", "consumes": {"resource": "plates", "amount": 1}, "processing_ms": 40}
    ]
}"#;

fn main() {
    env_logger::init();

    let plant = plant_from_json(SCENARIO).expect("scenario loads");
    let pools: Vec<_> = plant
        .resources()
        .map(|pool| (pool.name().to_string(), pool.id()))
        .collect();

    let mut supervisor = Supervisor::new(plant);
    supervisor.start().expect("fleet starts");

    // Let the economy run, draining reports as they arrive. The smelter
    // outpaces the market, so capacity reports on the plate pool show up
    // alongside the occasional ore shortage.
    for _ in 0..10 {
        thread::sleep(Duration::from_millis(50));
        supervisor.drain_events();
    }

    supervisor.shutdown().expect("clean shutdown");

    for (name, id) in pools {
        println!(
            "final level of '{}': {}",
            name,
            supervisor.resource_level(id).expect("pool registered")
        );
    }
}
