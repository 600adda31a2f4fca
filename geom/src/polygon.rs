use geo::{BoundingRect, Contains};

use crate::{GPSBounds, LonLat};

/// An area in longitude/latitude, possibly made of several disjoint parts, each of which may have
/// holes. Buffering separate routes produces one part per route unless they overlap.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    inner: geo::MultiPolygon<f64>,
}

impl Polygon {
    pub fn empty() -> Polygon {
        Polygon {
            inner: geo::MultiPolygon(Vec::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.0.is_empty()
    }

    pub fn num_parts(&self) -> usize {
        self.inner.0.len()
    }

    /// Does this area contain the point in its interior?
    pub fn contains_pt(&self, pt: LonLat) -> bool {
        let pt: geo::Point<f64> = pt.into();
        self.inner.0.iter().any(|poly| poly.contains(&pt))
    }

    pub fn get_bounds(&self) -> Option<GPSBounds> {
        let rect = self.inner.bounding_rect()?;
        Some(GPSBounds {
            min_lon: rect.min().x,
            min_lat: rect.min().y,
            max_lon: rect.max().x,
            max_lat: rect.max().y,
        })
    }

    /// Every ring (exteriors and holes) as a closed line, first point repeated at the end.
    pub fn rings(&self) -> Vec<Vec<LonLat>> {
        let mut result = Vec::new();
        for poly in &self.inner.0 {
            for ring in std::iter::once(poly.exterior()).chain(poly.interiors().iter()) {
                let pts: Vec<LonLat> = ring
                    .coords()
                    .map(|c| LonLat::new(c.x, c.y))
                    .collect();
                if pts.len() >= 2 {
                    result.push(pts);
                }
            }
        }
        result
    }

    pub fn as_geo(&self) -> &geo::MultiPolygon<f64> {
        &self.inner
    }

    pub fn to_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::from(&self.inner))
    }
}

impl From<geo::MultiPolygon<f64>> for Polygon {
    fn from(inner: geo::MultiPolygon<f64>) -> Self {
        Polygon { inner }
    }
}

impl From<geo::Polygon<f64>> for Polygon {
    fn from(poly: geo::Polygon<f64>) -> Self {
        Polygon {
            inner: geo::MultiPolygon(vec![poly]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        geo::Polygon::new(
            geo::LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            Vec::new(),
        )
        .into()
    }

    #[test]
    fn basic_queries() {
        let p = square();
        assert!(p.contains_pt(LonLat::new(0.5, 0.5)));
        assert!(!p.contains_pt(LonLat::new(1.5, 0.5)));
        assert_eq!(p.rings().len(), 1);
        assert_eq!(p.rings()[0].len(), 5);
        let b = p.get_bounds().unwrap();
        assert_eq!(b.to_bbox(), [0.0, 0.0, 1.0, 1.0]);
        assert!(Polygon::empty().get_bounds().is_none());
    }

    #[test]
    fn geojson_output() {
        match square().to_geojson().value {
            geojson::Value::MultiPolygon(parts) => assert_eq!(parts.len(), 1),
            x => panic!("unexpected {:?}", x),
        }
    }
}
