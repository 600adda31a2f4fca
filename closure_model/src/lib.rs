//! The closure corridor and everything derived from it: the road network, route normalization,
//! boundary detection, intersection topology, and the scenarios handed to the sign recommender.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod detector;
mod error;
mod road;
mod route;
mod scenario;
mod topology;

pub use crate::detector::{
    find_closure_boundaries, BoundaryPoint, BoundaryStatus, ClosureAnalysis, DetectorOptions,
};
pub use crate::error::ValidationError;
pub use crate::road::{RoadClass, RoadFeature, RoadID, RoadNetwork};
pub use crate::route::{RouteGeometry, RouteInput};
pub use crate::scenario::{
    build_scenario, build_scenarios, BoundaryType, ClosureContext, Constraints, NearbyPOIs,
    RiskLevel, Scenario, POI,
};
pub use crate::topology::{
    analyze_intersection, Approach, ApproachStatus, Intersection, IntersectionType,
    TopologyOptions,
};
