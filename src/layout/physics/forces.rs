use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadCell;

/// Below this separation repulsion stops growing.
const MIN_REPULSION_DISTANCE: f32 = 1.0;

/// Deterministic push direction for coincident points.
fn fallback_direction(first: usize, second: usize) -> Vec2 {
    let angle = ((first as f32) * 0.618_034 + (second as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Inverse-distance charge between two points; positive `magnitude` pushes `point` away.
fn charge(delta: Vec2, magnitude: f32, first: usize, second: usize) -> Vec2 {
    let distance = delta.length();
    let direction = if distance > 1e-4 {
        delta / distance
    } else {
        fallback_direction(first, second)
    };
    direction * (magnitude / distance.max(MIN_REPULSION_DISTANCE))
}

#[derive(Clone, Copy)]
pub(super) struct RepulsionParams {
    /// Already multiplied by the current energy; positive repels.
    pub(super) magnitude: f32,
    pub(super) theta: f32,
}

pub(super) fn accumulate_repulsion(
    cell: &QuadCell,
    index: usize,
    positions: &[Vec2],
    params: RepulsionParams,
    force: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[index];
    if cell.is_leaf() {
        for &other in &cell.indices {
            if other != index {
                *force += charge(point - positions[other], params.magnitude, index, other);
            }
        }
        return;
    }

    let delta = point - cell.center_of_mass;
    let distance = delta.length().max(1e-4);
    let far_enough = !cell.bounds.contains(point)
        && (cell.bounds.half_extent * 2.0 / distance) < params.theta;
    if far_enough {
        *force += charge(delta, params.magnitude * cell.mass, index, usize::MAX);
        return;
    }

    for child in cell.children() {
        accumulate_repulsion(child, index, positions, params, force);
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
}

/// Pushes apart every pair closer than the sum of their radii. Each pair is handled once, from
/// its lower index.
pub(super) fn accumulate_collisions(
    tree: &QuadCell,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    let mut neighbours = Vec::new();
    for index in 0..positions.len() {
        neighbours.clear();
        let reach = radii[index] + tree.max_radius;
        collect_within(tree, positions[index], reach * reach, index, &mut neighbours);

        for &other in &neighbours {
            let min_distance = radii[index] + radii[other];
            let delta = positions[index] - positions[other];
            let distance = delta.length();
            if distance >= min_distance {
                continue;
            }

            let direction = if distance > 1e-4 {
                delta / distance
            } else {
                fallback_direction(index, other)
            };
            let push = direction * ((min_distance - distance) * params.strength * 0.5);
            forces[index] += push;
            forces[other] -= push;
        }
    }
}

fn collect_within(
    cell: &QuadCell,
    point: Vec2,
    reach_sq: f32,
    index: usize,
    out: &mut Vec<usize>,
) {
    if cell.bounds.distance_sq_to(point) > reach_sq {
        return;
    }

    if cell.is_leaf() {
        out.extend(cell.indices.iter().copied().filter(|&other| other > index));
        return;
    }

    for child in cell.children() {
        collect_within(child, point, reach_sq, index, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repulsion_pushes_points_apart_with_inverse_distance() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let tree = QuadCell::build(&positions, &[0.0, 0.0]).expect("finite");
        let params = RepulsionParams {
            magnitude: 30.0,
            theta: 0.72,
        };

        let mut force = Vec2::ZERO;
        accumulate_repulsion(&tree, 0, &positions, params, &mut force);
        assert!((force - vec2(-3.0, 0.0)).length() < 1e-5);

        let mut force = Vec2::ZERO;
        accumulate_repulsion(&tree, 1, &positions, params, &mut force);
        assert!((force - vec2(3.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn far_clusters_match_direct_sum() {
        let mut positions = (0..20)
            .map(|index| vec2(1000.0 + (index % 5) as f32, (index / 5) as f32))
            .collect::<Vec<_>>();
        positions.push(vec2(0.0, 0.0));
        let radii = vec![0.0; positions.len()];
        let tree = QuadCell::build(&positions, &radii).expect("finite");
        let params = RepulsionParams {
            magnitude: 30.0,
            theta: 0.72,
        };

        let mut approximate = Vec2::ZERO;
        accumulate_repulsion(&tree, 20, &positions, params, &mut approximate);
        let exact = (0..20)
            .map(|other| charge(positions[20] - positions[other], 30.0, 20, other))
            .fold(Vec2::ZERO, |sum, force| sum + force);
        assert!((approximate - exact).length() < exact.length() * 0.05);
        assert!(approximate.x < 0.0);
    }

    #[test]
    fn collisions_only_touch_overlapping_pairs() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(100.0, 0.0)];
        let radii = vec![8.0, 8.0, 8.0];
        let tree = QuadCell::build(&positions, &radii).expect("finite");
        let mut forces = vec![Vec2::ZERO; 3];

        accumulate_collisions(
            &tree,
            &positions,
            &radii,
            CollisionParams { strength: 1.0 },
            &mut forces,
        );

        assert!((forces[0] - vec2(-3.0, 0.0)).length() < 1e-5);
        assert!((forces[1] - vec2(3.0, 0.0)).length() < 1e-5);
        assert_eq!(forces[2], Vec2::ZERO);
    }

    #[test]
    fn coincident_points_get_separated() {
        let positions = vec![vec2(4.0, 4.0), vec2(4.0, 4.0)];
        let radii = vec![5.0, 5.0];
        let tree = QuadCell::build(&positions, &radii).expect("finite");
        let mut forces = vec![Vec2::ZERO; 2];

        accumulate_collisions(
            &tree,
            &positions,
            &radii,
            CollisionParams { strength: 1.0 },
            &mut forces,
        );

        assert!(forces[0].length() > 4.9);
        assert!((forces[0] + forces[1]).length() < 1e-5);
    }
}
