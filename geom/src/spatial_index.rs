use std::fmt::Debug;

use rstar::{RTree, RTreeObject, AABB};

use crate::{Distance, GPSBounds, GeometryEngine, LonLat, Polygon};

/// Indexes line features by their bounding box, so candidate lookups don't scan everything.
/// Exact answers go through a `GeometryEngine`. Results always come back in the order features
/// were indexed.
pub struct SpatialIndex<K> {
    tree: RTree<IndexedLine<K>>,
    count: usize,
}

struct IndexedLine<K> {
    key: K,
    order: usize,
    pts: Vec<LonLat>,
    bounds: GPSBounds,
}

impl<K> RTreeObject for IndexedLine<K> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bounds.min_lon, self.bounds.min_lat],
            [self.bounds.max_lon, self.bounds.max_lat],
        )
    }
}

impl<K: Clone + Debug> SpatialIndex<K> {
    pub fn new() -> SpatialIndex<K> {
        SpatialIndex {
            tree: RTree::new(),
            count: 0,
        }
    }

    /// Adds features to the index. Features without any points can never match, so they're
    /// skipped.
    pub fn index<I: IntoIterator<Item = (K, Vec<LonLat>)>>(&mut self, features: I) {
        let mut batch = Vec::new();
        for (key, pts) in features {
            if pts.is_empty() {
                warn!("Not indexing {:?}, it has no points", key);
                continue;
            }
            let bounds = GPSBounds::from(&pts);
            batch.push(IndexedLine {
                key,
                order: self.count,
                pts,
                bounds,
            });
            self.count += 1;
        }

        if self.tree.size() == 0 {
            self.tree = RTree::bulk_load(batch);
        } else {
            for item in batch {
                self.tree.insert(item);
            }
        }
    }

    /// Every feature whose bounding box overlaps this one.
    pub fn query_bbox(&self, bounds: &GPSBounds) -> Vec<K> {
        self.candidates(bounds)
            .into_iter()
            .map(|item| item.key.clone())
            .collect()
    }

    /// Every feature passing within `radius` of the point.
    pub fn query_point<G: GeometryEngine>(
        &self,
        pt: LonLat,
        radius: Distance,
        engine: &G,
    ) -> Vec<K> {
        let search = GPSBounds::from(&[pt]).padded(radius);
        let mut result = Vec::new();
        for item in self.candidates(&search) {
            match engine.distance_to_line(pt, &item.pts) {
                Ok(dist) => {
                    if dist <= radius {
                        result.push(item.key.clone());
                    }
                }
                Err(err) => warn!("Skipping {:?} near {}: {}", item.key, pt, err),
            }
        }
        result
    }

    /// Every feature touching or crossing the area.
    pub fn query_intersects<G: GeometryEngine>(&self, area: &Polygon, engine: &G) -> Vec<K> {
        let bounds = match area.get_bounds() {
            Some(b) => b,
            None => return Vec::new(),
        };
        let mut result = Vec::new();
        for item in self.candidates(&bounds) {
            match engine.intersects(&item.pts, area) {
                Ok(true) => result.push(item.key.clone()),
                Ok(false) => {}
                Err(err) => warn!("Skipping {:?}: {}", item.key, err),
            }
        }
        result
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.count = 0;
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn candidates(&self, bounds: &GPSBounds) -> Vec<&IndexedLine<K>> {
        let envelope = AABB::from_corners(
            [bounds.min_lon, bounds.min_lat],
            [bounds.max_lon, bounds.max_lat],
        );
        let mut found: Vec<&IndexedLine<K>> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .collect();
        found.sort_by_key(|item| item.order);
        found
    }
}

impl<K: Clone + Debug> Default for SpatialIndex<K> {
    fn default() -> Self {
        SpatialIndex::new()
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    use super::*;
    use crate::{PlanarGeometry, Projection, Pt2D};

    fn offset(dx: f64, dy: f64) -> LonLat {
        Projection::centered_on(LonLat::new(-79.4, 43.65)).to_gps(Pt2D::new(dx, dy))
    }

    fn grid() -> SpatialIndex<String> {
        let mut index = SpatialIndex::new();
        index.index(vec![
            ("east".to_string(), vec![offset(0.0, 0.0), offset(100.0, 0.0)]),
            ("north".to_string(), vec![offset(0.0, 0.0), offset(0.0, 100.0)]),
            ("far".to_string(), vec![offset(1000.0, 1000.0), offset(1100.0, 1000.0)]),
            ("empty".to_string(), Vec::new()),
        ]);
        index
    }

    #[test]
    fn queries() {
        let engine = PlanarGeometry::new();
        let index = grid();
        assert_eq!(index.len(), 3);

        assert_eq!(
            index.query_point(offset(50.0, 20.0), Distance::meters(25.0), &engine),
            vec!["east".to_string()]
        );
        assert_eq!(
            index.query_point(offset(10.0, 10.0), Distance::meters(25.0), &engine),
            vec!["east".to_string(), "north".to_string()]
        );
        assert!(index
            .query_point(offset(500.0, 500.0), Distance::meters(25.0), &engine)
            .is_empty());

        let area = engine
            .buffer(
                &[vec![offset(900.0, 1000.0), offset(1200.0, 1000.0)]],
                Distance::meters(10.0),
            )
            .unwrap();
        assert_eq!(index.query_intersects(&area, &engine), vec!["far".to_string()]);

        let mut everything = GPSBounds::from(&[offset(-10.0, -10.0)]);
        everything.update(offset(2000.0, 2000.0));
        assert_eq!(index.query_bbox(&everything).len(), 3);
    }

    #[test]
    fn insertion_order_survives_incremental_adds() {
        let mut index = grid();
        index.index(vec![("late".to_string(), vec![offset(0.0, 0.0), offset(-50.0, 0.0)])]);
        let engine = PlanarGeometry::new();
        assert_eq!(
            index.query_point(offset(0.0, 5.0), Distance::meters(10.0), &engine),
            vec!["east".to_string(), "north".to_string(), "late".to_string()]
        );

        index.clear();
        assert!(index.is_empty());
    }

    #[test]
    fn matches_brute_force() {
        let engine = PlanarGeometry::new();
        let mut rng = XorShiftRng::seed_from_u64(42);
        let mut lines = Vec::new();
        for id in 0..200 {
            let x = rng.gen_range(-2000.0..2000.0);
            let y = rng.gen_range(-2000.0..2000.0);
            let dx = rng.gen_range(-200.0..200.0);
            let dy = rng.gen_range(-200.0..200.0);
            lines.push((id, vec![offset(x, y), offset(x + dx, y + dy)]));
        }
        let mut index = SpatialIndex::new();
        index.index(lines.clone());

        for _ in 0..20 {
            let pt = offset(rng.gen_range(-2000.0..2000.0), rng.gen_range(-2000.0..2000.0));
            let radius = Distance::meters(150.0);
            let expected: Vec<usize> = lines
                .iter()
                .filter(|(_, pts)| engine.distance_to_line(pt, pts).unwrap() <= radius)
                .map(|(id, _)| *id)
                .collect();
            assert_eq!(index.query_point(pt, radius, &engine), expected);
        }
    }
}
