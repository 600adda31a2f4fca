use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use geom::{Distance, GeometryEngine, LonLat};
use plan_util::Timer;

use crate::{
    analyze_intersection, Approach, BoundaryPoint, Intersection, RoadNetwork, TopologyOptions,
};

/// Being this close to the start or finish makes any location high risk.
const START_FINISH_RISK_RADIUS: Distance = Distance::const_meters(200.0);

/// A point of interest along an event, like the start line or a water station.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct POI {
    pub id: String,
    #[serde(rename = "type")]
    pub poi_type: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub description: String,
}

impl POI {
    pub fn pt(&self) -> LonLat {
        LonLat::new(self.lng, self.lat)
    }

    fn mentions(&self, word: &str) -> bool {
        self.poi_type.to_lowercase().contains(word)
            || self.description.to_lowercase().contains(word)
    }

    fn is_medical(&self) -> bool {
        self.poi_type == "medical"
    }

    fn is_water(&self) -> bool {
        self.poi_type == "waterstation" || self.description.to_lowercase().contains("water")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryType {
    OpenToClosed,
    PartialClosure,
}

impl Default for BoundaryType {
    fn default() -> Self {
        BoundaryType::OpenToClosed
    }
}

/// How the closure behaves at one boundary point, during one phase of the event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosureContext {
    pub phase: String,
    pub boundary_type: BoundaryType,
    pub blocks_straight: bool,
    pub creates_one_way: bool,
}

impl Default for ClosureContext {
    fn default() -> Self {
        ClosureContext {
            phase: "all".to_string(),
            boundary_type: BoundaryType::OpenToClosed,
            blocks_straight: false,
            creates_one_way: false,
        }
    }
}

/// Distances to the nearest point of interest of each kind, if there is one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NearbyPOIs {
    pub start: Option<Distance>,
    pub finish: Option<Distance>,
    pub medical: Option<Distance>,
    pub water: Option<Distance>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Busier intersections are riskier, and so is anywhere near the start or finish.
    pub fn assess(degree: usize, nearby: &NearbyPOIs) -> RiskLevel {
        let near_start_finish = [nearby.start, nearby.finish]
            .iter()
            .flatten()
            .any(|dist| *dist < START_FINISH_RISK_RADIUS);
        if near_start_finish || degree >= 4 {
            RiskLevel::High
        } else if degree == 3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Planning constraints, carried through untouched for whatever consumes the scenarios.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    /// Available devices by code
    pub inventory: BTreeMap<String, usize>,
    pub preferences: BTreeMap<String, serde_json::Value>,
}

/// Everything needed to decide on traffic control at one boundary point for one phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub phase: String,
    pub boundary_point_id: String,
    pub location: LonLat,
    #[serde(default)]
    pub intersection: Option<Intersection>,
    pub context: ClosureContext,
    #[serde(default)]
    pub detour: Option<serde_json::Value>,
    #[serde(default)]
    pub nearby: NearbyPOIs,
    pub risk: RiskLevel,
    #[serde(default)]
    pub constraints: Constraints,
}

impl Scenario {
    pub fn approaches(&self) -> &[Approach] {
        match self.intersection {
            Some(ref i) => &i.approaches,
            None => &[],
        }
    }
}

/// Combines one boundary point with its intersection and surroundings. The context's phase
/// becomes the scenario's phase.
pub fn build_scenario<G: GeometryEngine>(
    pt: &BoundaryPoint,
    intersection: Option<Intersection>,
    pois: &[POI],
    context: &ClosureContext,
    constraints: &Constraints,
    engine: &G,
) -> Scenario {
    let nearest = |pred: &dyn Fn(&POI) -> bool| -> Option<Distance> {
        pois.iter()
            .filter(|poi| pred(poi))
            .map(|poi| engine.distance(pt.pt, poi.pt()))
            .min()
    };
    let nearby = NearbyPOIs {
        start: nearest(&|poi| poi.mentions("start")),
        finish: nearest(&|poi| poi.mentions("finish")),
        medical: nearest(&|poi| poi.is_medical()),
        water: nearest(&|poi| poi.is_water()),
    };
    let degree = intersection.as_ref().map(|i| i.degree).unwrap_or(0);
    let risk = RiskLevel::assess(degree, &nearby);

    Scenario {
        phase: context.phase.clone(),
        boundary_point_id: pt.id.clone(),
        location: pt.pt,
        intersection,
        context: context.clone(),
        detour: None,
        nearby,
        risk,
        constraints: constraints.clone(),
    }
}

/// Analyzes every boundary point once and builds a scenario for each phase. Points with no roads
/// nearby produce no scenarios. With no phases given, the context's own phase is used.
#[allow(clippy::too_many_arguments)]
pub fn build_scenarios<G: GeometryEngine>(
    boundary_pts: &[BoundaryPoint],
    network: &RoadNetwork,
    pois: &[POI],
    phases: &[String],
    context: &ClosureContext,
    constraints: &Constraints,
    opts: &TopologyOptions,
    engine: &G,
    timer: &mut Timer,
) -> Vec<Scenario> {
    timer.start("build scenarios");
    let index = network.build_index();
    let phases: Vec<String> = if phases.is_empty() {
        vec![context.phase.clone()]
    } else {
        phases.to_vec()
    };

    let mut scenarios = Vec::new();
    for pt in boundary_pts {
        let intersection = match analyze_intersection(pt, network, &index, opts, engine) {
            Some(i) => i,
            None => {
                info!("Skipping {}, no roads nearby", pt.id);
                continue;
            }
        };
        for phase in &phases {
            let mut ctx = context.clone();
            ctx.phase = phase.clone();
            scenarios.push(build_scenario(
                pt,
                Some(intersection.clone()),
                pois,
                &ctx,
                constraints,
                engine,
            ));
        }
    }
    info!(
        "Built {} scenarios from {} boundary points",
        scenarios.len(),
        boundary_pts.len()
    );
    timer.stop("build scenarios");
    scenarios
}
