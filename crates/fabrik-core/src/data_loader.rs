//! Data-driven plant construction from JSON scenarios.
//!
//! Feature-gated behind `data-loader`. A scenario file names its pools and
//! systems; systems refer to pools by name, resolved here into ids. All
//! validation happens before anything touches a [`Plant`], so a bad file is
//! an error value, never a panic.

use std::collections::HashMap;
use std::time::Duration;

use crate::id::ResourceId;
use crate::plant::{Draw, Plant, PlantError, SystemSpec};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("plant error: {0}")]
    Plant(#[from] PlantError),
    #[error("unknown resource reference: {0}")]
    UnknownResource(String),
    #[error("duplicate resource name: {0}")]
    DuplicateResource(String),
    #[error("resource '{name}': initial {initial} exceeds capacity {capacity}")]
    InitialOverCapacity {
        name: String,
        initial: u32,
        capacity: u32,
    },
}

// ---------------------------------------------------------------------------
// JSON data structures
// ---------------------------------------------------------------------------

/// Top-level scenario structure for JSON deserialization.
#[derive(Debug, serde::Deserialize)]
pub struct ScenarioData {
    #[serde(default)]
    pub resources: Vec<ResourceData>,
    #[serde(default)]
    pub systems: Vec<SystemData>,
}

/// JSON representation of a resource pool.
#[derive(Debug, serde::Deserialize)]
pub struct ResourceData {
    pub name: String,
    #[serde(default)]
    pub initial: u32,
    pub capacity: u32,
}

/// JSON representation of a system.
#[derive(Debug, serde::Deserialize)]
pub struct SystemData {
    pub name: String,
    /// Absent for raw producers.
    #[serde(default)]
    pub consumes: Option<DrawData>,
    /// Absent for pure sinks.
    #[serde(default)]
    pub produces: Option<DrawData>,
    #[serde(default)]
    pub processing_ms: u64,
}

/// JSON representation of one side of a conversion; references a resource
/// by name.
#[derive(Debug, serde::Deserialize)]
pub struct DrawData {
    pub resource: String,
    pub amount: u32,
}

// ---------------------------------------------------------------------------
// Loading functions
// ---------------------------------------------------------------------------

/// Build a plant from a JSON scenario string.
pub fn plant_from_json(json: &str) -> Result<Plant, ScenarioError> {
    build_plant(serde_json::from_str(json)?)
}

/// Build a plant from JSON scenario bytes.
pub fn plant_from_json_bytes(bytes: &[u8]) -> Result<Plant, ScenarioError> {
    build_plant(serde_json::from_slice(bytes)?)
}

fn build_plant(data: ScenarioData) -> Result<Plant, ScenarioError> {
    let mut plant = Plant::new();
    let mut by_name: HashMap<String, ResourceId> = HashMap::new();

    // Phase 1: register all pools, validating before construction.
    for resource in &data.resources {
        if resource.initial > resource.capacity {
            return Err(ScenarioError::InitialOverCapacity {
                name: resource.name.clone(),
                initial: resource.initial,
                capacity: resource.capacity,
            });
        }
        let id = plant.add_resource(&resource.name, resource.initial, resource.capacity);
        if by_name.insert(resource.name.clone(), id).is_some() {
            return Err(ScenarioError::DuplicateResource(resource.name.clone()));
        }
    }

    // Phase 2: register all systems, resolving pool refs by name.
    for system in &data.systems {
        let consumed = resolve(&by_name, system.consumes.as_ref())?;
        let produced = resolve(&by_name, system.produces.as_ref())?;
        plant.add_system(SystemSpec {
            name: system.name.clone(),
            consumed,
            produced,
            processing_time: Duration::from_millis(system.processing_ms),
        })?;
    }

    Ok(plant)
}

fn resolve(
    by_name: &HashMap<String, ResourceId>,
    draw: Option<&DrawData>,
) -> Result<Option<Draw>, ScenarioError> {
    match draw {
        None => Ok(None),
        Some(draw) => {
            let resource = by_name
                .get(&draw.resource)
                .copied()
                .ok_or_else(|| ScenarioError::UnknownResource(draw.resource.clone()))?;
            Ok(Some(Draw {
                resource,
                amount: draw.amount,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"{
        "resources": [
            {"name": "ore", "initial": 20, "capacity": 100},
            {"name": "plates", "capacity": 50}
        ],
        "systems": [
            {"name": "mine", "produces": {"resource": "ore", "amount": 4}},
            {
                "name": "smelter",
                "consumes": {"resource": "ore", "amount": 2},
                "produces": {"resource": "plates", "amount": 1},
                "processing_ms": 5
            },
            {"name": "market", "consumes": {"resource": "plates", "amount": 1}}
        ]
    }"#;

    #[test]
    fn loads_a_full_scenario() {
        let plant = plant_from_json(SCENARIO).expect("scenario loads");
        assert_eq!(plant.resource_count(), 2);
        assert_eq!(plant.system_count(), 3);

        let ore = plant
            .resources()
            .find(|pool| pool.name() == "ore")
            .expect("ore pool");
        assert_eq!(ore.level(), 20);
        assert_eq!(ore.max_capacity(), 100);

        // The "initial" field defaults to zero when absent.
        let plates = plant
            .resources()
            .find(|pool| pool.name() == "plates")
            .expect("plate pool");
        assert_eq!(plates.level(), 0);
    }

    #[test]
    fn unknown_resource_name_is_an_error() {
        let json = r#"{
            "resources": [],
            "systems": [{"name": "mine", "produces": {"resource": "ore", "amount": 1}}]
        }"#;
        let err = plant_from_json(json).unwrap_err();
        assert!(matches!(err, ScenarioError::UnknownResource(name) if name == "ore"));
    }

    #[test]
    fn duplicate_resource_name_is_an_error() {
        let json = r#"{
            "resources": [
                {"name": "ore", "capacity": 10},
                {"name": "ore", "capacity": 20}
            ]
        }"#;
        let err = plant_from_json(json).unwrap_err();
        assert!(matches!(err, ScenarioError::DuplicateResource(name) if name == "ore"));
    }

    #[test]
    fn initial_over_capacity_is_an_error_not_a_panic() {
        let json = r#"{
            "resources": [{"name": "ore", "initial": 11, "capacity": 10}]
        }"#;
        let err = plant_from_json(json).unwrap_err();
        assert!(matches!(err, ScenarioError::InitialOverCapacity { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = plant_from_json("{not json").unwrap_err();
        assert!(matches!(err, ScenarioError::JsonParse(_)));
    }
}
