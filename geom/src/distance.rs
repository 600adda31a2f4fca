use std::{cmp, fmt, ops};

use serde::{Deserialize, Serialize};

/// Meters along the ground. Negative values are allowed: a device offset of -200m is 200m
/// upstream of its boundary point.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Distance(f64);

// Never NaN
impl Eq for Distance {}

#[allow(clippy::derive_ord_xor_partial_ord)]
impl Ord for Distance {
    fn cmp(&self, other: &Distance) -> cmp::Ordering {
        self.0
            .partial_cmp(&other.0)
            .unwrap_or(cmp::Ordering::Equal)
    }
}

impl Distance {
    pub const ZERO: Distance = Distance::const_meters(0.0);

    pub fn meters(value: f64) -> Distance {
        if !value.is_finite() {
            panic!("Bad Distance {}", value);
        }
        Distance(value)
    }

    /// For tables of constants. The caller promises the value is finite.
    pub const fn const_meters(value: f64) -> Distance {
        Distance(value)
    }

    /// To the nearest whole meter, with halves away from zero
    pub fn round(self) -> Distance {
        Distance(self.0.round())
    }

    pub fn inner_meters(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.abs() < 1000.0 {
            write!(f, "{}m", (self.0 * 10.0).round() / 10.0)
        } else {
            write!(f, "{}km", (self.0 / 100.0).round() / 10.0)
        }
    }
}

impl ops::Add for Distance {
    type Output = Distance;

    fn add(self, other: Distance) -> Distance {
        Distance::meters(self.0 + other.0)
    }
}

impl ops::Sub for Distance {
    type Output = Distance;

    fn sub(self, other: Distance) -> Distance {
        Distance::meters(self.0 - other.0)
    }
}

impl ops::Neg for Distance {
    type Output = Distance;

    fn neg(self) -> Distance {
        Distance(-self.0)
    }
}

/// How many times one distance fits in another, like devices along a taper.
impl ops::Div<Distance> for Distance {
    type Output = f64;

    fn div(self, other: Distance) -> f64 {
        if other == Distance::ZERO {
            panic!("Can't divide {} / {}", self, other);
        }
        self.0 / other.0
    }
}

impl Default for Distance {
    fn default() -> Distance {
        Distance::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_and_ordering() {
        assert_eq!(Distance::meters(161.11).round(), Distance::meters(161.0));
        assert_eq!(Distance::meters(-72.5).round(), Distance::meters(-73.0));

        let mut list = vec![
            Distance::meters(0.0),
            Distance::meters(-300.0),
            Distance::meters(-30.0),
        ];
        list.sort();
        assert_eq!(
            list,
            vec![
                Distance::meters(-300.0),
                Distance::meters(-30.0),
                Distance::ZERO
            ]
        );
        assert_eq!(
            Distance::meters(250.0).max(Distance::meters(150.0)),
            Distance::meters(250.0)
        );
    }

    #[test]
    fn arithmetic() {
        assert_eq!(
            -(Distance::meters(200.0) + Distance::meters(100.0)),
            Distance::meters(-300.0)
        );
        assert_eq!(Distance::meters(50.0) / Distance::meters(10.0), 5.0);
        assert_eq!(
            Distance::meters(50.0) - Distance::meters(60.0),
            Distance::meters(-10.0)
        );
    }

    #[test]
    fn serializes_as_plain_meters() {
        assert_eq!(serde_json::to_string(&Distance::meters(-150.0)).unwrap(), "-150.0");
        assert_eq!(Distance::meters(1500.0).to_string(), "1.5km");
        assert_eq!(Distance::meters(12.34).to_string(), "12.3m");
        assert_eq!(Distance::meters(-200.0).to_string(), "-200m");
    }
}
