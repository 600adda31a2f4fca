use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

use closure_model::{
    build_scenarios, find_closure_boundaries, BoundaryPoint, BoundaryStatus, BoundaryType,
    ClosureContext, Constraints, DetectorOptions, IntersectionType, RoadID, RoadNetwork,
    RouteGeometry, RouteInput, Scenario, TopologyOptions,
};
use geom::{Distance, GeometryEngine, PlanarGeometry};
use otm::{merge_and_sequence, BillOfMaterials, Device, Recommender};
use plan_util::Timer;
use tests::{dead_end_network, east_route, offset, random_network, t_junction_network};

fn boundaries(route: &RouteGeometry, network: &RoadNetwork) -> Vec<BoundaryPoint> {
    find_closure_boundaries(
        route,
        network,
        &DetectorOptions::default(),
        &PlanarGeometry::new(),
        &mut Timer::throwaway(),
    )
    .unwrap()
    .boundary_points
}

fn scenarios(
    network: &RoadNetwork,
    pts: &[BoundaryPoint],
    phases: &[&str],
    context: &ClosureContext,
) -> Vec<Scenario> {
    let phases: Vec<String> = phases.iter().map(|p| p.to_string()).collect();
    build_scenarios(
        pts,
        network,
        &[],
        &phases,
        context,
        &Constraints::default(),
        &TopologyOptions::default(),
        &PlanarGeometry::new(),
        &mut Timer::throwaway(),
    )
}

fn codes(devices: &[Device]) -> Vec<&str> {
    devices.iter().map(|d| d.code.as_str()).collect()
}

fn assert_sequenced(devices: &[Device]) {
    for pair in devices.windows(2) {
        assert!(
            pair[0].offset <= pair[1].offset,
            "{} at {} comes before {} at {}",
            pair[0].code,
            pair[0].offset,
            pair[1].code,
            pair[1].offset
        );
    }
    for (i, d1) in devices.iter().enumerate() {
        for d2 in &devices[i + 1..] {
            assert_ne!(d1.key(), d2.key(), "{} wasn't merged", d1.code);
        }
    }
}

#[test]
fn dead_end_gets_one_boundary_point() {
    let network = dead_end_network();
    let pts = boundaries(&east_route(), &network);
    assert_eq!(pts.len(), 1);
    assert_eq!(pts[0].status, BoundaryStatus::Boundary);
    assert!(PlanarGeometry::new().distance(pts[0].pt, offset(200.0, 50.0)) < Distance::meters(1.0));

    let scenarios = scenarios(&network, &pts, &[], &ClosureContext::default());
    assert_eq!(scenarios.len(), 1);
    let intersection = scenarios[0].intersection.as_ref().unwrap();
    assert_eq!(intersection.intersection_type, IntersectionType::DeadEnd);

    let devices = Recommender::default().recommend(&scenarios[0]);
    assert_eq!(codes(&devices), vec!["TC-2B", "Rb-92"]);
    assert_eq!(devices[0].offset, Distance::meters(-200.0));
    assert_eq!(devices[0].location, "Maple Cres");
    assert_eq!(devices[0].phase, "all");
}

#[test]
fn t_junction_full_plan() {
    let network = t_junction_network();
    let pts = boundaries(&east_route(), &network);
    assert_eq!(pts.len(), 1);
    assert_eq!(pts[0].id, "junction-west-east-0");
    assert_eq!(pts[0].status, BoundaryStatus::Intersection);
    assert_eq!(
        pts[0].roads,
        vec![
            RoadID("west".to_string()),
            RoadID("east".to_string()),
            RoadID("side".to_string())
        ]
    );

    let scenarios = scenarios(&network, &pts, &["setup", "race"], &ClosureContext::default());
    assert_eq!(scenarios.len(), 2);
    assert_eq!(scenarios[0].phase, "setup");
    assert_eq!(scenarios[1].phase, "race");
    let intersection = scenarios[0].intersection.as_ref().unwrap();
    assert_eq!(intersection.intersection_type, IntersectionType::T);
    assert_eq!(intersection.degree, 3);

    let recommender = Recommender::default();
    let devices = recommender.recommend(&scenarios[0]);
    assert_eq!(
        codes(&devices),
        vec!["TC-67", "TC-2B", "TC-3R", "Rb-46", "TC-4R", "Rb-92", "Rb-25R", "TC-53A", "TC-54"]
    );
    assert_sequenced(&devices);
    for d in &devices {
        assert_eq!(d.phase, "setup");
        assert_eq!(d.lat, scenarios[0].location.y());
    }

    let warning = &devices[1];
    assert_eq!(warning.location, "King St W");
    assert_eq!(
        warning.reason,
        "Advance warning for 60 km/h traffic; Advance warning for 60 km/h traffic; Advance \
         warning for 40 km/h traffic"
    );
    // Both halves of King St want 3 barricades at the same spot
    assert_eq!(devices[7].quantity, 3);
    assert_eq!(devices[8].quantity, 11);

    // The same scenario always gets the same plan, and it's already fully merged
    assert_eq!(recommender.recommend(&scenarios[0]), devices);
    assert_eq!(merge_and_sequence(devices.clone()), devices);

    let all: Vec<Device> = scenarios
        .iter()
        .flat_map(|s| recommender.recommend(s))
        .collect();
    let bom = BillOfMaterials::from_devices(&all, &["setup".to_string(), "race".to_string()]);
    assert_eq!(bom.phases.len(), 2);
    assert_eq!(bom.phases[0].total_cost(), bom.phases[1].total_cost());
    assert_eq!(bom.total_cost, bom.phases[0].total_cost() * 2.0);
}

#[test]
fn partial_closure_keeps_local_access() {
    let network = t_junction_network();
    let pts = boundaries(&east_route(), &network);
    let context = ClosureContext {
        boundary_type: BoundaryType::PartialClosure,
        blocks_straight: true,
        ..Default::default()
    };
    let scenarios = scenarios(&network, &pts, &[], &context);
    let devices = Recommender::default().recommend(&scenarios[0]);
    let codes = codes(&devices);
    assert!(codes.contains(&"TC-7tB"));
    assert!(codes.contains(&"Rb-10"));
    assert!(codes.contains(&"Rb-45"));
    for missing in ["Rb-92", "TC-67", "TC-53A", "TC-4R", "Rb-46"] {
        assert!(!codes.contains(&missing), "{} shouldn't be placed", missing);
    }
    assert_sequenced(&devices);
}

#[test]
fn random_networks() {
    let engine = PlanarGeometry::new();
    let opts = DetectorOptions::default();
    let recommender = Recommender::default();
    for seed in [1, 7, 42, 1234] {
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let network = random_network(&mut rng, 25);
        let analysis = find_closure_boundaries(
            &east_route(),
            &network,
            &opts,
            &engine,
            &mut Timer::throwaway(),
        )
        .unwrap();

        let pts = &analysis.boundary_points;
        for (i, pt1) in pts.iter().enumerate() {
            assert!(!pt1.roads.is_empty());
            if pt1.status == BoundaryStatus::Intersection {
                assert!(pt1.distance_to_edge <= opts.junction_tolerance);
            }
            for pt2 in &pts[i + 1..] {
                assert!(
                    engine.distance(pt1.pt, pt2.pt) >= opts.dedupe_threshold,
                    "seed {}: {} and {} are too close",
                    seed,
                    pt1.id,
                    pt2.id
                );
            }
        }
        for pt in pts {
            for id in &pt.roads {
                assert!(analysis.affected_roads.contains(id));
            }
        }

        for scenario in scenarios(&network, pts, &[], &ClosureContext::default()) {
            let devices = recommender.recommend(&scenario);
            assert_sequenced(&devices);
            assert_eq!(recommender.recommend(&scenario), devices);
            assert!(devices.iter().all(|d| d.quantity >= 1));
            assert!(devices
                .iter()
                .all(|d| d.confidence > 0.0 && d.confidence <= 1.0));
        }
    }
}

#[test]
fn plan_from_raw_json() {
    let route = serde_json::json!([
        [offset(0.0, 0.0).x(), offset(0.0, 0.0).y()],
        [offset(400.0, 0.0).x(), offset(400.0, 0.0).y()],
        [200.0, 95.0]
    ]);
    let road = |id: &str, highway: &str, pts: &[(f64, f64)]| {
        serde_json::json!({
            "type": "Feature",
            "properties": { "id": id, "highway": highway, "name": format!("{} Rd", id) },
            "geometry": {
                "type": "LineString",
                "coordinates": pts
                    .iter()
                    .map(|(x, y)| vec![offset(*x, *y).x(), offset(*x, *y).y()])
                    .collect::<Vec<_>>(),
            },
        })
    };
    let network = serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            road("cul", "residential", &[(100.0, 10.0), (100.0, 200.0)]),
            road("lane", "tertiary", &[(300.0, -10.0), (300.0, -200.0)]),
        ],
    });

    let route = RouteInput::from_json(&route).unwrap().normalize().unwrap();
    assert_eq!(route.num_points(), 2);
    let network = RoadNetwork::from_geojson(&network.to_string()).unwrap();
    assert_eq!(network.len(), 2);

    let pts = boundaries(&route, &network);
    let ids: Vec<&str> = pts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["boundary-cul-0", "boundary-lane-0"]);

    let scenarios = scenarios(&network, &pts, &["race"], &ClosureContext::default());
    let recommender = Recommender::default();
    let devices: Vec<Device> = scenarios
        .iter()
        .flat_map(|s| recommender.recommend(s))
        .collect();
    // The tertiary road also gets barricades
    assert_eq!(
        codes(&devices),
        vec!["TC-2B", "Rb-92", "TC-2B", "Rb-92", "TC-53A"]
    );

    let bom = BillOfMaterials::from_devices(&devices, &["race".to_string()]);
    let mut out = Vec::new();
    bom.write_csv("Waterfront 10K", &mut out).unwrap();
    let csv = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("Waterfront 10K,race,Rb-92,Road Closed,2,$15.00,$30.00,"));
    assert!(lines[2].starts_with("Waterfront 10K,race,TC-2B,Road Work,2,$15.00,$30.00,"));
    assert!(lines[3].starts_with("Waterfront 10K,race,TC-53A,Barricades,2,$25.00,$50.00,"));
}
