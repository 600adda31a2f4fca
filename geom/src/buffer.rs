use std::f64::consts::PI;

use anyhow::Result;
use geo::{BooleanOps, ConvexHull};

use crate::{Distance, LonLat, Polygon, Projection, Pt2D, EPSILON_DIST};

/// How many vertices approximate a full circle around each end of a segment.
const CIRCLE_VERTICES: usize = 32;

/// Everything within `radius` of any of the lines. Works in a local planar projection: each
/// segment becomes a capsule (a rectangle capped by two half-circles), and all capsules are
/// unioned together. Lines must already be validated.
pub fn buffer_lines(lines: &[Vec<LonLat>], radius: Distance) -> Result<Polygon> {
    if radius <= Distance::ZERO {
        bail!("Can't buffer by {}", radius);
    }
    let all_pts: Vec<LonLat> = lines.iter().flatten().cloned().collect();
    if all_pts.is_empty() {
        return Ok(Polygon::empty());
    }
    let proj = Projection::centered_on(LonLat::center(&all_pts));

    let mut shapes = Vec::new();
    for line in lines {
        let pts = simplify(proj.to_pts(line));
        if pts.len() == 1 {
            shapes.push(circle(pts[0], radius));
            continue;
        }
        for pair in pts.windows(2) {
            shapes.push(capsule(pair[0], pair[1], radius));
        }
    }

    let unioned = union_all(shapes);
    Ok(unproject(unioned, &proj).into())
}

/// Removes repeated points and interior points that don't change direction. Collinear runs
/// otherwise produce capsules with overlapping edges, which boolean ops handle poorly.
fn simplify(pts: Vec<Pt2D>) -> Vec<Pt2D> {
    let mut deduped: Vec<Pt2D> = Vec::new();
    for pt in pts {
        if deduped
            .last()
            .map(|last| last.approx_eq(pt, EPSILON_DIST))
            .unwrap_or(false)
        {
            continue;
        }
        deduped.push(pt);
    }

    let mut result: Vec<Pt2D> = Vec::new();
    for (idx, pt) in deduped.iter().enumerate() {
        if idx == 0 || idx == deduped.len() - 1 {
            result.push(*pt);
            continue;
        }
        let prev = result[result.len() - 1];
        let next = deduped[idx + 1];
        let (ax, ay) = (pt.x() - prev.x(), pt.y() - prev.y());
        let (bx, by) = (next.x() - pt.x(), next.y() - pt.y());
        let cross = ax * by - ay * bx;
        let dot = ax * bx + ay * by;
        let norms = (ax.hypot(ay) * bx.hypot(by)).max(f64::EPSILON);
        if dot > 0.0 && (cross / norms).abs() < 1e-9 {
            continue;
        }
        result.push(*pt);
    }
    result
}

/// The vertices of a circle, starting at `phase` radians. Starting both ends of a capsule at the
/// same phase, perpendicular to the segment, makes the hull's long edges exactly `radius` away.
fn circle_pts(center: Pt2D, radius: Distance, phase: f64) -> Vec<geo::Point<f64>> {
    (0..CIRCLE_VERTICES)
        .map(|i| {
            let theta = phase + 2.0 * PI * (i as f64) / (CIRCLE_VERTICES as f64);
            center.project_away(radius, theta).into()
        })
        .collect()
}

fn circle(center: Pt2D, radius: Distance) -> geo::Polygon<f64> {
    let mut pts: Vec<(f64, f64)> = circle_pts(center, radius, 0.0)
        .into_iter()
        .map(|pt| (pt.x(), pt.y()))
        .collect();
    pts.push(pts[0]);
    geo::Polygon::new(geo::LineString::from(pts), Vec::new())
}

fn capsule(pt1: Pt2D, pt2: Pt2D, radius: Distance) -> geo::Polygon<f64> {
    let phase = pt1.angle_to(pt2) + PI / 2.0;
    let mut pts = circle_pts(pt1, radius, phase);
    pts.extend(circle_pts(pt2, radius, phase));
    geo::MultiPoint::from(pts).convex_hull()
}

/// Pairwise union, so each boolean op works on similarly sized inputs instead of growing one
/// huge polygon a capsule at a time.
fn union_all(shapes: Vec<geo::Polygon<f64>>) -> geo::MultiPolygon<f64> {
    let mut level: Vec<geo::MultiPolygon<f64>> = shapes
        .into_iter()
        .map(|p| geo::MultiPolygon(vec![p]))
        .collect();
    if level.is_empty() {
        return geo::MultiPolygon(Vec::new());
    }
    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        let mut iter = level.into_iter();
        while let Some(a) = iter.next() {
            match iter.next() {
                Some(b) => next.push(a.union(&b)),
                None => next.push(a),
            }
        }
        level = next;
    }
    level.pop().unwrap_or_else(|| geo::MultiPolygon(Vec::new()))
}

fn unproject(mp: geo::MultiPolygon<f64>, proj: &Projection) -> geo::MultiPolygon<f64> {
    let ring = |ls: &geo::LineString<f64>| -> geo::LineString<f64> {
        ls.coords()
            .map(|c| {
                let gps = proj.to_gps(Pt2D::new(c.x, c.y));
                (gps.longitude, gps.latitude)
            })
            .collect::<Vec<_>>()
            .into()
    };
    geo::MultiPolygon(
        mp.0.iter()
            .map(|poly| {
                geo::Polygon::new(
                    ring(poly.exterior()),
                    poly.interiors().iter().map(ring).collect(),
                )
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> LonLat {
        LonLat::new(-79.4, 43.65)
    }

    fn offset(dx: f64, dy: f64) -> LonLat {
        Projection::centered_on(origin()).to_gps(Pt2D::new(dx, dy))
    }

    #[test]
    fn collinear_points_are_dropped() {
        let pts = vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(10.0, 0.0),
            Pt2D::new(10.0, 0.0),
            Pt2D::new(20.0, 0.0),
            Pt2D::new(20.0, 10.0),
        ];
        assert_eq!(
            simplify(pts),
            vec![Pt2D::new(0.0, 0.0), Pt2D::new(20.0, 0.0), Pt2D::new(20.0, 10.0)]
        );
    }

    #[test]
    fn straight_line_buffer() {
        let line = vec![offset(0.0, 0.0), offset(100.0, 0.0), offset(200.0, 0.0)];
        let poly = buffer_lines(&[line], Distance::meters(50.0)).unwrap();
        assert_eq!(poly.num_parts(), 1);
        assert!(poly.contains_pt(offset(100.0, 45.0)));
        assert!(poly.contains_pt(offset(230.0, 0.0)));
        assert!(!poly.contains_pt(offset(100.0, 55.0)));
        assert!(!poly.contains_pt(offset(260.0, 0.0)));
    }

    #[test]
    fn separate_routes_stay_separate() {
        let a = vec![offset(0.0, 0.0), offset(100.0, 0.0)];
        let b = vec![offset(0.0, 500.0), offset(100.0, 500.0)];
        let poly = buffer_lines(&[a, b], Distance::meters(50.0)).unwrap();
        assert_eq!(poly.num_parts(), 2);
        // Nothing fabricated between the two routes
        assert!(!poly.contains_pt(offset(50.0, 250.0)));
    }

    #[test]
    fn bent_line_buffer() {
        let line = vec![offset(0.0, 0.0), offset(100.0, 0.0), offset(100.0, 100.0)];
        let poly = buffer_lines(&[line], Distance::meters(20.0)).unwrap();
        assert_eq!(poly.num_parts(), 1);
        assert!(poly.contains_pt(offset(110.0, -10.0)));
        assert!(poly.contains_pt(offset(100.0, 110.0)));
        assert!(!poly.contains_pt(offset(50.0, 50.0)));
    }

    #[test]
    fn bad_radius() {
        let line = vec![offset(0.0, 0.0), offset(100.0, 0.0)];
        assert!(buffer_lines(&[line], Distance::ZERO).is_err());
    }
}
