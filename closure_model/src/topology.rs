use serde::{Deserialize, Serialize};

use geom::{Distance, GeometryEngine, LonLat, SpatialIndex};

use crate::{BoundaryPoint, RoadClass, RoadID, RoadNetwork};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyOptions {
    /// Roads passing within this distance of a boundary point are approaches to it
    pub search_radius: Distance,
}

impl Default for TopologyOptions {
    fn default() -> Self {
        TopologyOptions {
            search_radius: Distance::meters(100.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntersectionType {
    DeadEnd,
    Straight,
    #[serde(rename = "T")]
    T,
    FourWay,
    MultiLeg,
}

impl IntersectionType {
    /// Purely by the number of approaches. Zero approaches isn't an intersection at all.
    pub fn from_degree(degree: usize) -> Option<IntersectionType> {
        match degree {
            0 => None,
            1 => Some(IntersectionType::DeadEnd),
            2 => Some(IntersectionType::Straight),
            3 => Some(IntersectionType::T),
            4 => Some(IntersectionType::FourWay),
            _ => Some(IntersectionType::MultiLeg),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApproachStatus {
    Open,
    Closed,
}

/// A road entering a boundary point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Approach {
    pub road_id: RoadID,
    pub road_name: String,
    pub road_class: RoadClass,
    pub oneway: bool,
    pub lanes: usize,
    pub speed_kmh: usize,
    pub status: ApproachStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub intersection_type: IntersectionType,
    pub degree: usize,
    pub approaches: Vec<Approach>,
    pub center: LonLat,
}

/// Describes the shape of the road network around a boundary point. Returns `None` if no road
/// passes nearby.
///
/// Nothing here can tell whether an approach is itself closed, so every approach is open.
pub fn analyze_intersection<G: GeometryEngine>(
    pt: &BoundaryPoint,
    network: &RoadNetwork,
    index: &SpatialIndex<usize>,
    opts: &TopologyOptions,
    engine: &G,
) -> Option<Intersection> {
    let approaches: Vec<Approach> = index
        .query_point(pt.pt, opts.search_radius, engine)
        .into_iter()
        .map(|idx| {
            let road = &network.roads()[idx];
            Approach {
                road_id: road.id.clone(),
                road_name: road.name.clone(),
                road_class: road.class,
                oneway: road.oneway,
                lanes: road.lanes,
                speed_kmh: road.speed_kmh(),
                status: ApproachStatus::Open,
            }
        })
        .collect();

    let degree = approaches.len();
    let intersection_type = match IntersectionType::from_degree(degree) {
        Some(x) => x,
        None => {
            debug!("No roads within {} of {}", opts.search_radius, pt.id);
            return None;
        }
    };
    Some(Intersection {
        intersection_type,
        degree,
        approaches,
        center: pt.pt,
    })
}
