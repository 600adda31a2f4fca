//! Fixtures shared by the end-to-end tests. Positions are given in meters east and north of a
//! fixed origin in downtown Toronto.

use rand::Rng;
use rand_xorshift::XorShiftRng;

use closure_model::{RoadFeature, RoadID, RoadNetwork, RouteGeometry};
use geom::{LonLat, Projection, Pt2D};
use plan_util::Tags;

pub fn origin() -> LonLat {
    LonLat::new(-79.3832, 43.6532)
}

pub fn offset(east: f64, north: f64) -> LonLat {
    Projection::centered_on(origin()).to_gps(Pt2D::new(east, north))
}

pub fn road(id: &str, tags: &[(&str, &str)], pts: &[(f64, f64)]) -> RoadFeature {
    let mut t = Tags::empty();
    for (k, v) in tags {
        t.insert(*k, *v);
    }
    RoadFeature::from_tags(
        RoadID(id.to_string()),
        pts.iter().map(|(x, y)| offset(*x, *y)).collect(),
        t,
    )
}

/// A 400m route heading east from the origin.
pub fn east_route() -> RouteGeometry {
    RouteGeometry {
        lines: vec![vec![offset(0.0, 0.0), offset(400.0, 0.0)]],
    }
}

/// King St runs parallel to the route, 40m north, and is split where Bathurst St leaves it heading
/// north. The junction is 10m inside the edge of a 50m closure.
pub fn t_junction_network() -> RoadNetwork {
    RoadNetwork::new(vec![
        road(
            "west",
            &[("highway", "secondary"), ("name", "King St W"), ("lanes", "2")],
            &[(-200.0, 40.0), (200.0, 40.0)],
        ),
        road(
            "east",
            &[("highway", "secondary"), ("name", "King St E")],
            &[(200.0, 40.0), (600.0, 40.0)],
        ),
        road(
            "side",
            &[("highway", "residential"), ("name", "Bathurst St")],
            &[(200.0, 40.0), (200.0, 400.0)],
        ),
        road(
            "far",
            &[("highway", "primary"), ("name", "Queen St")],
            &[(-200.0, 600.0), (600.0, 600.0)],
        ),
    ])
}

/// One cul-de-sac starting inside the closure and leaving it to the north.
pub fn dead_end_network() -> RoadNetwork {
    RoadNetwork::new(vec![road(
        "cul-de-sac",
        &[("highway", "residential"), ("name", "Maple Cres")],
        &[(200.0, 10.0), (200.0, 200.0)],
    )])
}

/// Roads with random shapes and tags scattered around the route.
pub fn random_network(rng: &mut XorShiftRng, num_roads: usize) -> RoadNetwork {
    let classes = ["primary", "secondary", "tertiary", "residential", "service"];
    let mut roads = Vec::new();
    for idx in 0..num_roads {
        let num_pts = rng.gen_range(2..5);
        let pts: Vec<(f64, f64)> = (0..num_pts)
            .map(|_| (rng.gen_range(-200.0..600.0), rng.gen_range(-300.0..300.0)))
            .collect();
        let highway = classes[rng.gen_range(0..classes.len())];
        let lanes = rng.gen_range(1..5).to_string();
        let maxspeed = (rng.gen_range(3..10) * 10).to_string();
        roads.push(road(
            &format!("r{}", idx),
            &[
                ("highway", highway),
                ("lanes", lanes.as_str()),
                ("maxspeed", maxspeed.as_str()),
            ],
            &pts,
        ));
    }
    RoadNetwork::new(roads)
}
