use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Distance;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// longitude is x, latitude is y
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct LonLat {
    pub longitude: f64,
    pub latitude: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> LonLat {
        LonLat {
            longitude: lon,
            latitude: lat,
        }
    }

    pub fn x(&self) -> f64 {
        self.longitude
    }

    pub fn y(&self) -> f64 {
        self.latitude
    }

    /// Is this a real place on Earth? Rejects NaN and out-of-range coordinates.
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && self.longitude.abs() <= 180.0
            && self.latitude.abs() <= 90.0
    }

    /// Great-circle distance, using the haversine formula.
    pub fn gps_dist(self, other: LonLat) -> Distance {
        let lon1 = self.longitude.to_radians();
        let lon2 = other.longitude.to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let delta_lat = lat2 - lat1;
        let delta_lon = lon2 - lon1;

        let a = (delta_lat / 2.0).sin().powi(2)
            + (delta_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        Distance::meters(EARTH_RADIUS_METERS * c)
    }

    /// Finds the average of a set of coordinates.
    pub fn center(pts: &[LonLat]) -> LonLat {
        let mut lon = 0.0;
        let mut lat = 0.0;
        for pt in pts {
            lon += pt.longitude;
            lat += pt.latitude;
        }
        let len = pts.len().max(1) as f64;
        LonLat {
            longitude: lon / len,
            latitude: lat / len,
        }
    }

    /// Rounds both coordinates to 4 decimal places (about 11m), expressed as integers so they
    /// can be hashed and compared exactly.
    pub fn to_4dp_key(self) -> (i64, i64) {
        (
            (self.longitude * 10_000.0).round() as i64,
            (self.latitude * 10_000.0).round() as i64,
        )
    }

    pub fn to_geojson(self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::Point(vec![self.longitude, self.latitude]))
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LonLat({0}, {1})", self.longitude, self.latitude)
    }
}

impl From<LonLat> for geo::Point<f64> {
    fn from(pt: LonLat) -> Self {
        geo::Point::new(pt.longitude, pt.latitude)
    }
}

impl From<geo::Point<f64>> for LonLat {
    fn from(pt: geo::Point<f64>) -> Self {
        LonLat::new(pt.x(), pt.y())
    }
}

/// An axis-aligned bounding box in longitude/latitude.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GPSBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GPSBounds {
    pub fn new() -> GPSBounds {
        GPSBounds {
            min_lon: f64::MAX,
            min_lat: f64::MAX,
            max_lon: f64::MIN,
            max_lat: f64::MIN,
        }
    }

    pub fn from(pts: &[LonLat]) -> GPSBounds {
        let mut b = GPSBounds::new();
        for pt in pts {
            b.update(*pt);
        }
        b
    }

    pub fn update(&mut self, pt: LonLat) {
        self.min_lon = self.min_lon.min(pt.longitude);
        self.max_lon = self.max_lon.max(pt.longitude);
        self.min_lat = self.min_lat.min(pt.latitude);
        self.max_lat = self.max_lat.max(pt.latitude);
    }

    /// False until at least one point has been added.
    pub fn is_valid(&self) -> bool {
        self.min_lon <= self.max_lon && self.min_lat <= self.max_lat
    }

    pub fn contains(&self, pt: LonLat) -> bool {
        pt.longitude >= self.min_lon
            && pt.longitude <= self.max_lon
            && pt.latitude >= self.min_lat
            && pt.latitude <= self.max_lat
    }

    /// Grows the box by roughly `dist` on every side. The longitude padding is scaled by the
    /// latitude of the box's widest edge, so the result always covers `dist`.
    pub fn padded(&self, dist: Distance) -> GPSBounds {
        let meters = dist.inner_meters().max(0.0);
        let dlat = (meters / EARTH_RADIUS_METERS).to_degrees();
        let widest_lat = self.min_lat.abs().max(self.max_lat.abs()).min(89.0);
        let dlon = dlat / widest_lat.to_radians().cos();
        GPSBounds {
            min_lon: self.min_lon - dlon,
            min_lat: self.min_lat - dlat,
            max_lon: self.max_lon + dlon,
            max_lat: self.max_lat + dlat,
        }
    }

    /// As `[min_lon, min_lat, max_lon, max_lat]`, the GeoJSON bbox order.
    pub fn to_bbox(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

impl Default for GPSBounds {
    fn default() -> Self {
        GPSBounds::new()
    }
}
