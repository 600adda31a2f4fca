use std::collections::BTreeSet;

use anyhow::Result;

use closure_model::{
    find_closure_boundaries, ClosureAnalysis, DetectorOptions, RoadNetwork, RouteGeometry,
    RouteInput,
};
use geom::PlanarGeometry;
use plan_util::Timer;

use crate::{positive_meters, Inputs};

pub fn run(inputs: Inputs, output: String) -> Result<()> {
    let mut timer = Timer::new("find closure boundaries");
    let (route, network) = load(&inputs, &mut timer)?;
    let analysis = detect(&inputs, &route, &network, &mut timer)?;
    let names: BTreeSet<String> = analysis
        .affected_roads
        .iter()
        .filter_map(|id| network.get(id))
        .map(|r| r.name.clone())
        .collect();
    info!("The closure touches {}", plan_util::plain_list_names(names));
    fs_err::write(&output, analysis.to_geojson().to_string())?;
    info!(
        "Wrote {} boundary points to {}",
        analysis.boundary_points.len(),
        output
    );
    timer.done();
    Ok(())
}

pub fn load(inputs: &Inputs, timer: &mut Timer) -> Result<(RouteGeometry, RoadNetwork)> {
    timer.start("load inputs");
    let raw: serde_json::Value = plan_util::read_json(&inputs.route)?;
    let route = RouteInput::from_json(&raw)?.normalize()?;
    let network = RoadNetwork::from_geojson(&fs_err::read_to_string(&inputs.roads)?)?;
    info!(
        "Route has {} points, road network has {} roads",
        plan_util::prettyprint_usize(route.num_points()),
        plan_util::prettyprint_usize(network.len())
    );
    timer.stop("load inputs");
    Ok((route, network))
}

pub fn detect(
    inputs: &Inputs,
    route: &RouteGeometry,
    network: &RoadNetwork,
    timer: &mut Timer,
) -> Result<ClosureAnalysis> {
    let opts = DetectorOptions {
        buffer: positive_meters("buffer-meters", inputs.buffer_meters)?,
        ..Default::default()
    };
    find_closure_boundaries(route, network, &opts, &PlanarGeometry::new(), timer)
}
