use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use closure_model::{Approach, ApproachStatus, Intersection, Scenario};
use geom::Distance;

use crate::rules::{Rule, Situation, RULES};
use crate::{catalog, Device, DeviceKey};

/// Tunable placement standards. Speeds are in km/h.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Standards {
    /// The floor for the second advance warning
    pub min_advance_distance: Distance,
    /// The floor for the first advance warning
    pub primary_min_advance: Distance,
    /// At or above this, flashing arrow boards are needed
    pub high_speed_threshold: usize,
    /// Not used by any rule yet
    pub min_speed_for_warning: usize,
    /// At or above this, drums replace cones
    pub drum_speed_threshold: usize,
    /// Channelization covers this much road
    pub taper_length: Distance,
    /// How far before the intersection turn lane signs go
    pub turn_sign_offset: Distance,
}

impl Default for Standards {
    fn default() -> Self {
        Standards {
            min_advance_distance: Distance::meters(150.0),
            primary_min_advance: Distance::meters(200.0),
            high_speed_threshold: 70,
            min_speed_for_warning: 50,
            drum_speed_threshold: 60,
            taper_length: Distance::meters(50.0),
            turn_sign_offset: Distance::meters(30.0),
        }
    }
}

/// How far upstream an advance warning goes: 2 seconds of travel plus 50m, but never less than
/// `min`. Rounded to the nearest meter.
pub fn advance_distance(speed_kmh: usize, min: Distance) -> Distance {
    let by_speed = Distance::meters((speed_kmh as f64) / 3.6 * 2.0 + 50.0);
    by_speed.max(min).round()
}

pub struct Recommender {
    standards: Standards,
}

impl Recommender {
    pub fn new(standards: Standards) -> Recommender {
        Recommender { standards }
    }

    /// The devices for one scenario, merged and ordered upstream first. Identical scenarios always
    /// produce identical lists.
    pub fn recommend(&self, scenario: &Scenario) -> Vec<Device> {
        let devices: Vec<Device> = self
            .explain(scenario)
            .into_iter()
            .map(|(_, device)| device)
            .collect();
        let before = devices.len();
        let merged = merge_and_sequence(devices);
        debug!(
            "{}: {} devices, {} after merging",
            scenario.boundary_point_id,
            before,
            merged.len()
        );
        merged
    }

    /// Every device each rule produced, before merging, tagged by the rule's name.
    pub fn explain(&self, scenario: &Scenario) -> Vec<(&'static str, Device)> {
        let intersection = match scenario.intersection {
            Some(ref i) => i,
            None => return Vec::new(),
        };
        let open: Vec<&Approach> = scenario
            .approaches()
            .iter()
            .filter(|a| a.status == ApproachStatus::Open)
            .collect();

        let mut result = Vec::new();
        for approach in &open {
            for rule in RULES.iter().filter(|r| r.stage.per_approach()) {
                if let Some(device) = self.apply(rule, approach, intersection, scenario) {
                    result.push((rule.name, device));
                }
            }
        }
        for rule in RULES.iter().filter(|r| !r.stage.per_approach()) {
            for approach in &open {
                if let Some(device) = self.apply(rule, approach, intersection, scenario) {
                    result.push((rule.name, device));
                }
            }
        }
        result
    }

    fn apply(
        &self,
        rule: &Rule,
        approach: &Approach,
        intersection: &Intersection,
        scenario: &Scenario,
    ) -> Option<Device> {
        let situation = Situation {
            approach,
            intersection,
            context: &scenario.context,
            standards: &self.standards,
        };
        if !(rule.applies)(&situation) {
            return None;
        }
        let placement = (rule.make)(&situation);
        Some(Device {
            code: placement.code.to_string(),
            quantity: placement.quantity.max(1),
            location: if approach.road_name.is_empty() {
                "Road".to_string()
            } else {
                approach.road_name.clone()
            },
            offset: placement.offset,
            reason: placement.reason,
            confidence: placement.confidence,
            phase: if scenario.context.phase.is_empty() {
                "all".to_string()
            } else {
                scenario.context.phase.clone()
            },
            lat: scenario.location.latitude,
            lng: scenario.location.longitude,
            cost: catalog::unit_cost(placement.code),
        })
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Recommender::new(Standards::default())
    }
}

/// Collapses devices at the same place (by `DeviceKey`), keeping the highest quantity and
/// confidence and every reason. The first device seen for a key keeps its spot, then everything
/// is stably sorted by offset, so upstream devices come first.
pub fn merge_and_sequence(devices: Vec<Device>) -> Vec<Device> {
    let mut merged: Vec<Device> = Vec::new();
    let mut seen: BTreeMap<DeviceKey, usize> = BTreeMap::new();
    for device in devices {
        let key = device.key();
        if let Some(idx) = seen.get(&key) {
            let existing = &mut merged[*idx];
            existing.quantity = existing.quantity.max(device.quantity);
            existing.confidence = existing.confidence.max(device.confidence);
            existing.reason = format!("{}; {}", existing.reason, device.reason);
        } else {
            seen.insert(key, merged.len());
            merged.push(device);
        }
    }
    merged.sort_by_key(|d| d.offset);
    merged
}
