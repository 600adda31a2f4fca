//! Geographic primitives for closure planning. Everything is stored in longitude/latitude; the
//! `GeometryEngine` trait hides how buffering, intersection and distance are computed, so the
//! rest of the workspace never touches a projection directly.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod buffer;
mod distance;
mod engine;
mod gps;
mod polygon;
mod projection;
mod spatial_index;

pub use crate::distance::Distance;
pub use crate::engine::{GeometryEngine, PlanarGeometry};
pub use crate::gps::{GPSBounds, LonLat};
pub use crate::polygon::Polygon;
pub use crate::projection::{Projection, Pt2D};
pub use crate::spatial_index::SpatialIndex;

/// About one centimeter. Points closer than this are treated as the same point.
pub const EPSILON_DIST: Distance = Distance::const_meters(0.01);
