use serde::{Deserialize, Serialize};

use geom::{Distance, LonLat};

use crate::catalog;

/// One placement of a sign or device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// A key into the sign catalog
    pub code: String,
    pub quantity: usize,
    /// Which road this goes on
    pub location: String,
    /// Along the approach relative to the boundary point. Negative is upstream.
    pub offset: Distance,
    pub reason: String,
    /// In [0, 1]
    pub confidence: f64,
    pub phase: String,
    pub lat: f64,
    pub lng: f64,
    /// Per unit. Zero means "use the catalog price".
    #[serde(default)]
    pub cost: f64,
}

impl Device {
    pub fn pt(&self) -> LonLat {
        LonLat::new(self.lng, self.lat)
    }

    /// An explicit cost on the device wins over the catalog.
    pub fn unit_cost(&self) -> f64 {
        if self.cost > 0.0 {
            self.cost
        } else {
            catalog::unit_cost(&self.code)
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.unit_cost() * (self.quantity.max(1) as f64)
    }

    pub fn key(&self) -> DeviceKey {
        let (lng, lat) = self.pt().to_4dp_key();
        DeviceKey {
            code: self.code.clone(),
            lat,
            lng,
            offset: self.offset,
        }
    }
}

/// Devices sharing all of these are the same placement. Coordinates are rounded to 4 decimal
/// places.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeviceKey {
    pub code: String,
    pub lat: i64,
    pub lng: i64,
    pub offset: Distance,
}
