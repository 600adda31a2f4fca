use anyhow::Result;
use serde::{Deserialize, Serialize};

use geom::{Distance, GeometryEngine, LonLat, Polygon};
use plan_util::Timer;

use crate::{RoadClass, RoadID, RoadNetwork, RouteGeometry, ValidationError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    /// How far the closure extends on either side of the route
    pub buffer: Distance,
    /// Road junctions this close to the edge of the closure become control points
    pub junction_tolerance: Distance,
    /// Boundary points closer than this are the same point
    pub dedupe_threshold: Distance,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        DetectorOptions {
            buffer: Distance::meters(50.0),
            junction_tolerance: Distance::meters(50.0),
            dedupe_threshold: Distance::meters(10.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryStatus {
    /// A real junction between roads, near the edge of the closure
    Intersection,
    /// A road crossing the edge of the closure, away from any junction
    Boundary,
}

/// A place where the open road network meets the closure and needs traffic control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub id: String,
    pub pt: LonLat,
    pub road_id: RoadID,
    pub road_name: String,
    pub road_class: RoadClass,
    pub status: BoundaryStatus,
    /// Every road meeting here, in the order they were found
    pub roads: Vec<RoadID>,
    /// Roughly how far this point is from the edge of the closure
    pub distance_to_edge: Distance,
}

pub struct ClosureAnalysis {
    pub closure: Polygon,
    pub affected_roads: Vec<RoadID>,
    pub boundary_points: Vec<BoundaryPoint>,
}

impl ClosureAnalysis {
    pub fn empty() -> ClosureAnalysis {
        ClosureAnalysis {
            closure: Polygon::empty(),
            affected_roads: Vec::new(),
            boundary_points: Vec::new(),
        }
    }

    /// The closure area and every boundary point, as one FeatureCollection.
    pub fn to_geojson(&self) -> geojson::FeatureCollection {
        let mut features = Vec::new();

        let mut props = serde_json::Map::new();
        props.insert("type".to_string(), "closure".into());
        props.insert(
            "affected_roads".to_string(),
            serde_json::Value::Array(
                self.affected_roads
                    .iter()
                    .map(|r| r.0.clone().into())
                    .collect(),
            ),
        );
        features.push(geojson::Feature {
            bbox: None,
            geometry: Some(self.closure.to_geojson()),
            id: None,
            properties: Some(props),
            foreign_members: None,
        });

        for pt in &self.boundary_points {
            let props = match serde_json::to_value(pt) {
                Ok(serde_json::Value::Object(map)) => map,
                _ => serde_json::Map::new(),
            };
            features.push(geojson::Feature {
                bbox: None,
                geometry: Some(pt.pt.to_geojson()),
                id: None,
                properties: Some(props),
                foreign_members: None,
            });
        }

        geojson::FeatureCollection {
            bbox: self.closure.get_bounds().map(|b| b.to_bbox().to_vec()),
            features,
            foreign_members: None,
        }
    }
}

/// Buffers the route into a closure, finds the roads it touches, and works out where each of
/// those roads needs to be controlled.
///
/// Junctions between affected roads near the closure's edge come first. Roads that don't reach
/// any such junction (like dead ends) contribute their own crossings of the edge instead.
pub fn find_closure_boundaries<G: GeometryEngine>(
    route: &RouteGeometry,
    network: &RoadNetwork,
    opts: &DetectorOptions,
    engine: &G,
    timer: &mut Timer,
) -> Result<ClosureAnalysis> {
    if route.is_empty() || network.is_empty() {
        info!("Nothing to analyze; the route or the road network is empty");
        return Ok(ClosureAnalysis::empty());
    }
    for (idx, line) in route.lines.iter().enumerate() {
        if line.len() < 2 {
            return Err(ValidationError::new(format!(
                "route {} has {} coordinates, need at least 2",
                idx,
                line.len()
            ))
            .into());
        }
    }

    timer.start("buffer route");
    let closure = engine.buffer(&route.lines, opts.buffer)?;
    timer.stop("buffer route");

    timer.start("find affected roads");
    let index = network.build_index();
    let affected: Vec<usize> = index.query_intersects(&closure, engine);
    timer.stop("find affected roads");
    info!(
        "{} of {} roads touch the closure",
        affected.len(),
        network.len()
    );

    let edges = engine.boundary(&closure);

    timer.start("find junctions near the edge");
    let mut junctions = find_junctions(&affected, network, &edges, opts, engine);
    timer.stop("find junctions near the edge");

    timer.start("find direct crossings");
    let crossings = find_crossings(&affected, &junctions, network, &edges, opts, engine);
    timer.stop("find direct crossings");

    let num_candidates = junctions.len() + crossings.len();
    junctions.extend(crossings);
    let boundary_points = dedupe(junctions, opts.dedupe_threshold, engine);
    info!(
        "Found {} boundary points ({} before deduplication)",
        boundary_points.len(),
        num_candidates
    );

    Ok(ClosureAnalysis {
        closure,
        affected_roads: affected
            .into_iter()
            .map(|idx| network.roads()[idx].id.clone())
            .collect(),
        boundary_points,
    })
}

/// Where pairs of affected roads meet, close to the edge of the closure.
fn find_junctions<G: GeometryEngine>(
    affected: &[usize],
    network: &RoadNetwork,
    edges: &[Vec<LonLat>],
    opts: &DetectorOptions,
    engine: &G,
) -> Vec<BoundaryPoint> {
    let roads = network.roads();
    let mut junctions: Vec<BoundaryPoint> = Vec::new();
    for (i, idx1) in affected.iter().enumerate() {
        for idx2 in &affected[i + 1..] {
            let (road1, road2) = (&roads[*idx1], &roads[*idx2]);
            let hits = match engine.line_intersections(&road1.geometry, &road2.geometry) {
                Ok(hits) => hits,
                Err(err) => {
                    warn!("Can't intersect {} with {}: {}", road1.id, road2.id, err);
                    continue;
                }
            };

            for (hit_idx, pt) in hits.into_iter().enumerate() {
                let dist = match distance_to_edges(pt, edges, engine) {
                    Some(dist) => dist,
                    None => continue,
                };
                if dist > opts.junction_tolerance {
                    continue;
                }

                if let Some(existing) = junctions
                    .iter_mut()
                    .find(|j| engine.distance(j.pt, pt) < opts.dedupe_threshold)
                {
                    for id in [&road1.id, &road2.id] {
                        if !existing.roads.contains(id) {
                            existing.roads.push(id.clone());
                        }
                    }
                    continue;
                }

                junctions.push(BoundaryPoint {
                    id: format!("junction-{}-{}-{}", road1.id, road2.id, hit_idx),
                    pt,
                    road_id: road1.id.clone(),
                    road_name: road1.name.clone(),
                    road_class: road1.class,
                    status: BoundaryStatus::Intersection,
                    roads: vec![road1.id.clone(), road2.id.clone()],
                    distance_to_edge: dist,
                });
            }
        }
    }
    junctions
}

/// Where affected roads cross the edge of the closure directly, for roads that don't already pass
/// by a junction.
fn find_crossings<G: GeometryEngine>(
    affected: &[usize],
    junctions: &[BoundaryPoint],
    network: &RoadNetwork,
    edges: &[Vec<LonLat>],
    opts: &DetectorOptions,
    engine: &G,
) -> Vec<BoundaryPoint> {
    let mut crossings = Vec::new();
    for idx in affected {
        let road = &network.roads()[*idx];

        let near_junction = junctions.iter().any(|j| {
            match engine.distance_to_line(j.pt, &road.geometry) {
                Ok(dist) => dist < opts.dedupe_threshold,
                Err(_) => false,
            }
        });
        if near_junction {
            continue;
        }

        let mut count = 0;
        for edge in edges {
            let hits = match engine.line_intersections(&road.geometry, edge) {
                Ok(hits) => hits,
                Err(err) => {
                    warn!("Can't find where {} crosses the closure: {}", road.id, err);
                    break;
                }
            };
            for pt in hits {
                crossings.push(BoundaryPoint {
                    id: format!("boundary-{}-{}", road.id, count),
                    pt,
                    road_id: road.id.clone(),
                    road_name: road.name.clone(),
                    road_class: road.class,
                    status: BoundaryStatus::Boundary,
                    roads: vec![road.id.clone()],
                    distance_to_edge: Distance::ZERO,
                });
                count += 1;
            }
        }
    }
    crossings
}

fn distance_to_edges<G: GeometryEngine>(
    pt: LonLat,
    edges: &[Vec<LonLat>],
    engine: &G,
) -> Option<Distance> {
    edges
        .iter()
        .filter_map(|edge| match engine.distance_to_line(pt, edge) {
            Ok(dist) => Some(dist),
            Err(err) => {
                warn!("Can't measure from {} to the closure edge: {}", pt, err);
                None
            }
        })
        .min()
}

/// Keeps the first of any points closer than the threshold.
fn dedupe<G: GeometryEngine>(
    pts: Vec<BoundaryPoint>,
    threshold: Distance,
    engine: &G,
) -> Vec<BoundaryPoint> {
    let mut result: Vec<BoundaryPoint> = Vec::new();
    for pt in pts {
        if result
            .iter()
            .any(|existing| engine.distance(existing.pt, pt.pt) < threshold)
        {
            continue;
        }
        result.push(pt);
    }
    result
}
