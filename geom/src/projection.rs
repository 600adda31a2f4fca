use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Distance, LonLat};

const METERS_PER_DEGREE_LAT: f64 = 111_194.926_644_558_73;

/// A point in a local planar frame, in meters. Only meaningful together with the `Projection`
/// that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt2D {
    x: f64,
    y: f64,
}

impl Pt2D {
    pub fn new(x: f64, y: f64) -> Pt2D {
        Pt2D { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn dist_to(self, to: Pt2D) -> Distance {
        Distance::meters(((self.x - to.x).powi(2) + (self.y - to.y).powi(2)).sqrt())
    }

    /// The angle from this point to another, in radians, counter-clockwise from +x.
    pub fn angle_to(self, to: Pt2D) -> f64 {
        (to.y - self.y).atan2(to.x - self.x)
    }

    pub fn project_away(self, dist: Distance, theta_radians: f64) -> Pt2D {
        let (sin, cos) = theta_radians.sin_cos();
        Pt2D::new(
            self.x + dist.inner_meters() * cos,
            self.y + dist.inner_meters() * sin,
        )
    }

    pub fn approx_eq(self, other: Pt2D, threshold: Distance) -> bool {
        self.dist_to(other) <= threshold
    }
}

impl fmt::Display for Pt2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pt2D({0}, {1})", self.x, self.y)
    }
}

impl From<Pt2D> for geo::Point<f64> {
    fn from(pt: Pt2D) -> Self {
        geo::Point::new(pt.x, pt.y)
    }
}

/// An equirectangular projection centered on one point. Distances are accurate to well under a
/// percent within a few kilometers of the origin, which covers any single event. The mapping is
/// affine in (longitude, latitude), so intersections and containment don't change across it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    origin: LonLat,
    meters_per_degree_lon: f64,
}

impl Projection {
    pub fn centered_on(origin: LonLat) -> Projection {
        let meters_per_degree_lon = METERS_PER_DEGREE_LAT
            * origin.latitude.to_radians().cos().max(f64::EPSILON);
        Projection {
            origin,
            meters_per_degree_lon,
        }
    }

    pub fn origin(&self) -> LonLat {
        self.origin
    }

    pub fn to_pt(&self, gps: LonLat) -> Pt2D {
        Pt2D::new(
            (gps.longitude - self.origin.longitude) * self.meters_per_degree_lon,
            (gps.latitude - self.origin.latitude) * METERS_PER_DEGREE_LAT,
        )
    }

    pub fn to_pts(&self, gps: &[LonLat]) -> Vec<Pt2D> {
        gps.iter().map(|pt| self.to_pt(*pt)).collect()
    }

    pub fn to_gps(&self, pt: Pt2D) -> LonLat {
        LonLat::new(
            self.origin.longitude + pt.x() / self.meters_per_degree_lon,
            self.origin.latitude + pt.y() / METERS_PER_DEGREE_LAT,
        )
    }
}
