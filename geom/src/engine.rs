use anyhow::Result;
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{EuclideanDistance, Intersects};

use crate::{buffer, Distance, GPSBounds, LonLat, Polygon, Projection, EPSILON_DIST};

/// Geometric operations over longitude/latitude inputs. Closure analysis only talks to this
/// trait, so the backend can be swapped without touching the detector or the scenario builder.
///
/// Malformed input (a line with fewer than 2 points, or a coordinate that isn't a real place)
/// produces an error; callers decide whether to skip or abort.
pub trait GeometryEngine {
    /// Everything within `radius` of any of the lines.
    fn buffer(&self, lines: &[Vec<LonLat>], radius: Distance) -> Result<Polygon>;

    /// Does the line touch or cross the area?
    fn intersects(&self, line: &[LonLat], area: &Polygon) -> Result<bool>;

    /// Every point where the two lines properly cross or touch, in order along `a`. Overlapping
    /// collinear stretches are not crossings and are ignored.
    fn line_intersections(&self, a: &[LonLat], b: &[LonLat]) -> Result<Vec<LonLat>>;

    /// The outline of an area as closed lines, one per ring.
    fn boundary(&self, area: &Polygon) -> Vec<Vec<LonLat>> {
        area.rings()
    }

    /// Great-circle distance between two points.
    fn distance(&self, a: LonLat, b: LonLat) -> Distance {
        a.gps_dist(b)
    }

    /// The shortest distance from a point to any part of a line.
    fn distance_to_line(&self, pt: LonLat, line: &[LonLat]) -> Result<Distance>;

    fn bbox(&self, pts: &[LonLat]) -> Option<GPSBounds> {
        if pts.is_empty() {
            return None;
        }
        Some(GPSBounds::from(pts))
    }
}

/// Computes everything in a local equirectangular projection, which is accurate over the few
/// kilometers a single event spans.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlanarGeometry;

impl PlanarGeometry {
    pub fn new() -> PlanarGeometry {
        PlanarGeometry
    }
}

impl GeometryEngine for PlanarGeometry {
    fn buffer(&self, lines: &[Vec<LonLat>], radius: Distance) -> Result<Polygon> {
        for line in lines {
            validate_line(line)?;
        }
        buffer::buffer_lines(lines, radius)
    }

    fn intersects(&self, line: &[LonLat], area: &Polygon) -> Result<bool> {
        let ls = to_line_string(line)?;
        Ok(area.as_geo().0.iter().any(|poly| poly.intersects(&ls)))
    }

    fn line_intersections(&self, a: &[LonLat], b: &[LonLat]) -> Result<Vec<LonLat>> {
        validate_line(a)?;
        validate_line(b)?;

        let mut result: Vec<LonLat> = Vec::new();
        for seg_a in a.windows(2) {
            let bounds_a = GPSBounds::from(seg_a);
            for seg_b in b.windows(2) {
                let bounds_b = GPSBounds::from(seg_b);
                if bounds_b.min_lon > bounds_a.max_lon
                    || bounds_b.max_lon < bounds_a.min_lon
                    || bounds_b.min_lat > bounds_a.max_lat
                    || bounds_b.max_lat < bounds_a.min_lat
                {
                    continue;
                }
                match line_intersection(to_line(seg_a), to_line(seg_b)) {
                    Some(LineIntersection::SinglePoint { intersection, .. }) => {
                        let pt = LonLat::new(intersection.x, intersection.y);
                        // Touching at a shared vertex shows up once per adjacent segment
                        if !result
                            .iter()
                            .any(|existing| existing.gps_dist(pt) < EPSILON_DIST)
                        {
                            result.push(pt);
                        }
                    }
                    Some(LineIntersection::Collinear { .. }) => {
                        debug!("Ignoring a collinear overlap between two lines");
                    }
                    None => {}
                }
            }
        }
        Ok(result)
    }

    fn distance_to_line(&self, pt: LonLat, line: &[LonLat]) -> Result<Distance> {
        validate_line(line)?;
        if !pt.is_valid() {
            bail!("Bad point {}", pt);
        }
        let proj = Projection::centered_on(pt);
        let ls: geo::LineString<f64> = proj
            .to_pts(line)
            .into_iter()
            .map(|p| (p.x(), p.y()))
            .collect::<Vec<_>>()
            .into();
        let dist = geo::Point::new(0.0, 0.0).euclidean_distance(&ls);
        Ok(Distance::meters(dist))
    }
}

fn validate_line(pts: &[LonLat]) -> Result<()> {
    if pts.len() < 2 {
        bail!("A line needs at least 2 points, but got {}", pts.len());
    }
    if let Some(pt) = pts.iter().find(|pt| !pt.is_valid()) {
        bail!("Line has a bad coordinate {}", pt);
    }
    Ok(())
}

fn to_line_string(pts: &[LonLat]) -> Result<geo::LineString<f64>> {
    validate_line(pts)?;
    Ok(pts
        .iter()
        .map(|pt| (pt.longitude, pt.latitude))
        .collect::<Vec<_>>()
        .into())
}

fn to_line(seg: &[LonLat]) -> geo::Line<f64> {
    geo::Line::new(
        (seg[0].longitude, seg[0].latitude),
        (seg[1].longitude, seg[1].latitude),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pt2D;

    fn offset(dx: f64, dy: f64) -> LonLat {
        Projection::centered_on(LonLat::new(-79.4, 43.65)).to_gps(Pt2D::new(dx, dy))
    }

    #[test]
    fn crossing_lines() {
        let engine = PlanarGeometry::new();
        let a = vec![offset(-100.0, 0.0), offset(100.0, 0.0)];
        let b = vec![offset(0.0, -100.0), offset(0.0, 100.0)];
        let hits = engine.line_intersections(&a, &b).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(engine.distance(hits[0], offset(0.0, 0.0)) < Distance::meters(0.01));

        let far = vec![offset(500.0, -100.0), offset(500.0, 100.0)];
        assert!(engine.line_intersections(&a, &far).unwrap().is_empty());
    }

    #[test]
    fn shared_vertex_counts_once() {
        let engine = PlanarGeometry::new();
        let a = vec![offset(-100.0, 0.0), offset(0.0, 0.0), offset(100.0, 0.0)];
        let b = vec![offset(0.0, -100.0), offset(0.0, 0.0), offset(0.0, 100.0)];
        assert_eq!(engine.line_intersections(&a, &b).unwrap().len(), 1);
    }

    #[test]
    fn collinear_overlap_is_not_a_crossing() {
        let engine = PlanarGeometry::new();
        let a = vec![offset(0.0, 0.0), offset(100.0, 0.0)];
        let b = vec![offset(50.0, 0.0), offset(150.0, 0.0)];
        assert!(engine.line_intersections(&a, &b).unwrap().is_empty());
    }

    #[test]
    fn malformed_lines() {
        let engine = PlanarGeometry::new();
        let good = vec![offset(0.0, 0.0), offset(100.0, 0.0)];
        assert!(engine.line_intersections(&[offset(0.0, 0.0)], &good).is_err());
        assert!(engine
            .line_intersections(&[offset(0.0, 0.0), LonLat::new(f64::NAN, 1.0)], &good)
            .is_err());
        assert!(engine.distance_to_line(offset(0.0, 0.0), &[]).is_err());
        assert!(engine.buffer(&[vec![offset(0.0, 0.0)]], Distance::meters(5.0)).is_err());
    }

    #[test]
    fn distances() {
        let engine = PlanarGeometry::new();
        let line = vec![offset(0.0, 0.0), offset(100.0, 0.0)];
        let d = engine.distance_to_line(offset(50.0, 30.0), &line).unwrap();
        assert!((d.inner_meters() - 30.0).abs() < 0.1);
        let d = engine.distance_to_line(offset(140.0, 30.0), &line).unwrap();
        assert!((d.inner_meters() - 50.0).abs() < 0.1);
    }

    #[test]
    fn buffer_and_intersects() {
        let engine = PlanarGeometry::new();
        let route = vec![offset(0.0, 0.0), offset(200.0, 0.0)];
        let area = engine.buffer(&[route], Distance::meters(50.0)).unwrap();

        let crossing = vec![offset(100.0, -200.0), offset(100.0, 200.0)];
        let inside = vec![offset(50.0, 10.0), offset(60.0, 10.0)];
        let outside = vec![offset(0.0, 100.0), offset(200.0, 100.0)];
        assert!(engine.intersects(&crossing, &area).unwrap());
        assert!(engine.intersects(&inside, &area).unwrap());
        assert!(!engine.intersects(&outside, &area).unwrap());

        // The crossing road hits the outline twice, once on each side
        let rings = engine.boundary(&area);
        assert_eq!(rings.len(), 1);
        assert_eq!(engine.line_intersections(&crossing, &rings[0]).unwrap().len(), 2);

        let bounds = engine.bbox(&rings[0]).unwrap();
        assert!(bounds.contains(offset(-45.0, 0.0)));
        assert!(engine.bbox(&[]).is_none());
    }
}
