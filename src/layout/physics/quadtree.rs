use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (min, max) = points.iter().fold(
            (
                vec2(f32::INFINITY, f32::INFINITY),
                vec2(f32::NEG_INFINITY, f32::NEG_INFINITY),
            ),
            |(min, max), point| (min.min(*point), max.max(*point)),
        );

        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half_extent && offset.y <= self.half_extent
    }

    /// Squared gap between `point` and the square; zero when inside.
    pub(super) fn distance_sq_to(self, point: Vec2) -> f32 {
        let gap = ((point - self.center).abs() - Vec2::splat(self.half_extent)).max(Vec2::ZERO);
        gap.length_sq()
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn quadrant(self, index: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let sign_x = if index & 1 == 0 { -1.0 } else { 1.0 };
        let sign_y = if index & 2 == 0 { -1.0 } else { 1.0 };
        Self {
            center: self.center + vec2(sign_x * quarter, sign_y * quarter),
            half_extent: quarter,
        }
    }
}

/// Barnes-Hut cell. Leaves keep their point indices; inner cells only aggregate.
pub(super) struct QuadCell {
    pub(super) bounds: Square,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    /// Largest collision radius of any point below this cell.
    pub(super) max_radius: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<QuadCell>>; 4],
}

impl QuadCell {
    pub(super) fn build(positions: &[Vec2], radii: &[f32]) -> Option<Self> {
        let bounds = Square::enclosing(positions)?;
        Some(Self::build_cell(
            bounds,
            (0..positions.len()).collect(),
            positions,
            radii,
            0,
        ))
    }

    fn build_cell(
        bounds: Square,
        indices: Vec<usize>,
        positions: &[Vec2],
        radii: &[f32],
        depth: usize,
    ) -> Self {
        let mass = indices.len() as f32;
        let mut center_of_mass = Vec2::ZERO;
        let mut max_radius = 0.0_f32;
        for &index in &indices {
            center_of_mass += positions[index];
            max_radius = max_radius.max(radii.get(index).copied().unwrap_or(0.0));
        }
        if mass > 0.0 {
            center_of_mass /= mass;
        }

        let mut cell = Self {
            bounds,
            center_of_mass,
            mass,
            max_radius,
            indices,
            children: std::array::from_fn(|_| None),
        };
        if depth >= MAX_DEPTH || cell.indices.len() <= LEAF_CAPACITY {
            return cell;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &cell.indices {
            buckets[bounds.quadrant_of(positions[index])].push(index);
        }
        // Coincident points would otherwise recurse to MAX_DEPTH for nothing.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return cell;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                cell.children[quadrant] = Some(Box::new(Self::build_cell(
                    bounds.quadrant(quadrant),
                    bucket,
                    positions,
                    radii,
                    depth + 1,
                )));
            }
        }
        cell.indices.clear();
        cell
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &QuadCell> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_mass_and_splits_past_capacity() {
        let positions = (0..40)
            .map(|index| vec2((index % 8) as f32 * 10.0, (index / 8) as f32 * 10.0))
            .collect::<Vec<_>>();
        let radii = vec![3.0; positions.len()];
        let tree = QuadCell::build(&positions, &radii).expect("finite points");

        assert_eq!(tree.mass, 40.0);
        assert!(!tree.is_leaf());
        assert_eq!(tree.max_radius, 3.0);
        let leaf_total: f32 = tree.children().map(|child| child.mass).sum();
        assert_eq!(leaf_total, 40.0);
        for position in &positions {
            assert!(tree.bounds.contains(*position));
        }
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![vec2(5.0, 5.0); 30];
        let tree = QuadCell::build(&positions, &[1.0; 30]).expect("finite points");
        assert!(tree.is_leaf());
        assert_eq!(tree.indices.len(), 30);
    }

    #[test]
    fn rejects_non_finite_points() {
        assert!(QuadCell::build(&[vec2(f32::NAN, 0.0)], &[1.0]).is_none());
        assert!(QuadCell::build(&[], &[]).is_none());
    }

    #[test]
    fn distance_to_square_is_zero_inside() {
        let square = Square {
            center: Vec2::ZERO,
            half_extent: 10.0,
        };
        assert_eq!(square.distance_sq_to(vec2(3.0, -4.0)), 0.0);
        assert_eq!(square.distance_sq_to(vec2(13.0, 14.0)), 25.0);
    }
}
