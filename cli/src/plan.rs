use anyhow::Result;
use serde::Serialize;

use closure_model::{
    build_scenarios, BoundaryType, ClosureContext, Constraints, RiskLevel, TopologyOptions, POI,
};
use geom::{LonLat, PlanarGeometry};
use otm::{BillOfMaterials, Device, Recommender, Standards};
use plan_util::Timer;

use crate::boundaries::{detect, load};
use crate::{positive_meters, Inputs};

pub struct Args {
    pub inputs: Inputs,
    pub pois: Option<String>,
    pub phases: Vec<String>,
    pub boundary_type: BoundaryType,
    pub blocks_straight: bool,
    pub creates_one_way: bool,
    pub search_radius_meters: f64,
    pub standards: Option<String>,
    pub output: String,
    pub bom: Option<String>,
    pub event_name: String,
}

/// The plan for one boundary point during one phase
#[derive(Serialize)]
struct ScenarioPlan {
    boundary_point_id: String,
    location: LonLat,
    phase: String,
    risk: RiskLevel,
    devices: Vec<Device>,
}

#[derive(Serialize)]
struct Output {
    event: String,
    affected_roads: usize,
    scenarios: Vec<ScenarioPlan>,
    total_cost: f64,
}

pub fn run(args: Args) -> Result<()> {
    let mut timer = Timer::new("plan closure");
    let engine = PlanarGeometry::new();

    let (route, network) = load(&args.inputs, &mut timer)?;
    let pois: Vec<POI> = match args.pois {
        Some(ref path) => plan_util::read_json(path)?,
        None => Vec::new(),
    };
    let standards: Standards = match args.standards {
        Some(ref path) => plan_util::read_json(path)?,
        None => Standards::default(),
    };

    let analysis = detect(&args.inputs, &route, &network, &mut timer)?;
    let context = ClosureContext {
        boundary_type: args.boundary_type,
        blocks_straight: args.blocks_straight,
        creates_one_way: args.creates_one_way,
        ..Default::default()
    };
    let topology = TopologyOptions {
        search_radius: positive_meters("search-radius-meters", args.search_radius_meters)?,
    };
    let scenarios = build_scenarios(
        &analysis.boundary_points,
        &network,
        &pois,
        &args.phases,
        &context,
        &Constraints::default(),
        &topology,
        &engine,
        &mut timer,
    );

    timer.start("recommend devices");
    let recommender = Recommender::new(standards);
    let mut plans = Vec::new();
    let mut all_devices = Vec::new();
    for scenario in &scenarios {
        let devices = recommender.recommend(scenario);
        if devices.is_empty() {
            timer.warn(format!(
                "No devices recommended at {} for phase {}",
                scenario.boundary_point_id, scenario.phase
            ));
        }
        all_devices.extend(devices.iter().cloned());
        plans.push(ScenarioPlan {
            boundary_point_id: scenario.boundary_point_id.clone(),
            location: scenario.location,
            phase: scenario.phase.clone(),
            risk: scenario.risk,
            devices,
        });
    }
    timer.stop("recommend devices");

    let bom = BillOfMaterials::from_devices(&all_devices, &args.phases);
    info!(
        "{} devices across {} scenarios, costing ${:.2}",
        plan_util::prettyprint_usize(all_devices.len()),
        plan_util::prettyprint_usize(plans.len()),
        bom.total_cost
    );

    plan_util::write_json(
        &args.output,
        &Output {
            event: args.event_name.clone(),
            affected_roads: analysis.affected_roads.len(),
            scenarios: plans,
            total_cost: bom.total_cost,
        },
    )?;
    if let Some(ref path) = args.bom {
        bom.write_csv(&args.event_name, fs_err::File::create(path)?)?;
        info!("Wrote bill of materials to {}", path);
    }

    for warning in timer.warnings() {
        warn!("{}", warning);
    }
    timer.done();
    Ok(())
}
