mod forces;
mod quadtree;

use eframe::egui::Vec2;

use crate::config::{AngularAnchor, RelaxationConfig};

use super::LayoutNode;
use super::constraint::project;
use super::geometry::polar;
use super::links::Edge;
use forces::{CollisionParams, RepulsionParams, accumulate_collisions, accumulate_repulsion};
use quadtree::QuadCell;

const BARNES_HUT_THETA: f32 = 0.72;

#[derive(Default)]
pub(super) struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    radii: Vec<f32>,
}

/// Frame time in 60 Hz ticks, bounded so a stalled frame cannot blow the integration up.
pub(super) fn time_scale(delta_seconds: f32) -> f32 {
    if !delta_seconds.is_finite() {
        return 1.0;
    }
    (delta_seconds * 60.0).clamp(0.25, 3.0)
}

/// Exponential cooling toward zero; snaps to zero below `alpha_min`.
pub(super) fn cool(alpha: f32, config: &RelaxationConfig, time_scale: f32) -> f32 {
    let retained = (1.0 - config.alpha_decay.clamp(0.0, 1.0)).powf(time_scale);
    let next = alpha * retained;
    if next < config.alpha_min { 0.0 } else { next }
}

/// Accumulates every ambient force for the non-dragged nodes and integrates one step.
pub(super) fn integrate(
    nodes: &mut [LayoutNode],
    edges: &[Edge],
    config: &RelaxationConfig,
    alpha: f32,
    time_scale: f32,
    scratch: &mut PhysicsScratch,
) {
    let node_count = nodes.len();
    if node_count == 0 || alpha <= 0.0 {
        return;
    }

    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);
    scratch.positions.clear();
    scratch.positions.extend(nodes.iter().map(|node| node.position));
    scratch.radii.clear();
    scratch.radii.extend(
        nodes
            .iter()
            .map(|node| config.collision_radius.for_kind(node.kind)),
    );

    let forces = &mut scratch.forces;
    let positions = &scratch.positions;
    let radii = &scratch.radii;

    if let Some(tree) = QuadCell::build(positions, radii) {
        let repulsion = RepulsionParams {
            magnitude: -config.repulsion_strength * alpha,
            theta: BARNES_HUT_THETA,
        };
        for (index, force) in forces.iter_mut().enumerate() {
            accumulate_repulsion(&tree, index, positions, repulsion, force);
        }

        accumulate_collisions(
            &tree,
            positions,
            radii,
            CollisionParams {
                strength: config.collision_strength,
            },
            forces,
        );
    }

    if config.link_attraction {
        for edge in edges {
            let (Some(source), Some(target)) = (positions.get(edge.source), positions.get(edge.target))
            else {
                continue;
            };
            let delta = *target - *source;
            let distance = delta.length();
            if distance <= 1e-4 {
                continue;
            }
            let pull = delta * ((distance - config.link_rest_length) / distance)
                * config.link_strength
                * alpha;
            forces[edge.source] += pull;
            forces[edge.target] -= pull;
        }
    }

    for (node, force) in nodes.iter().zip(forces.iter_mut()) {
        *force += pinning_force(node, config, alpha);
    }

    let damping = (1.0 - config.velocity_decay.clamp(0.0, 1.0)).powf(time_scale);
    let max_speed = config.max_speed;
    for (node, force) in nodes.iter_mut().zip(forces.iter()) {
        if node.dragging {
            node.velocity = Vec2::ZERO;
            continue;
        }

        let mut velocity = (node.velocity + *force * time_scale) * damping;
        let speed = velocity.length();
        if speed > max_speed {
            velocity *= max_speed / speed;
        }
        if !velocity.is_finite() {
            velocity = Vec2::ZERO;
        }

        node.velocity = velocity;
        node.position += velocity * time_scale;
    }
}

/// Radial spring toward the resting radius plus x/y springs toward the anchor point.
fn pinning_force(node: &LayoutNode, config: &RelaxationConfig, alpha: f32) -> Vec2 {
    let distance = node.position.length();
    let outward = if distance > 1e-4 {
        node.position / distance
    } else {
        polar(node.resting_angle, 1.0)
    };
    let radial = outward * ((node.resting_radius - distance) * config.radial_strength * alpha);

    let anchor_angle = match (config.angular_anchor, &node.cell) {
        (AngularAnchor::SectorMidpoint, Some(cell)) => cell.sector.midpoint(),
        _ => node.resting_angle,
    };
    let anchor = polar(anchor_angle, node.resting_radius);
    let angular = (anchor - node.position) * (config.angular_strength * alpha);

    radial + angular
}

/// Clamps every placed node back into its cell. Dragged nodes keep their angle.
pub(super) fn project_all(nodes: &mut [LayoutNode]) {
    for node in nodes {
        if let Some(cell) = &node.cell {
            node.position = project(node.position, cell, !node.dragging);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_scale_is_bounded() {
        assert_eq!(time_scale(1.0 / 60.0), 1.0);
        assert_eq!(time_scale(10.0), 3.0);
        assert_eq!(time_scale(0.0), 0.25);
        assert_eq!(time_scale(f32::NAN), 1.0);
    }

    #[test]
    fn cooling_reaches_zero() {
        let config = RelaxationConfig::default();
        let mut alpha = 1.0;
        let mut ticks = 0;
        while alpha > 0.0 {
            alpha = cool(alpha, &config, 1.0);
            ticks += 1;
            assert!(ticks < 1000, "energy never settled");
        }
        // Same schedule as a d3 simulation: ~300 ticks from full heat.
        assert!((290..=310).contains(&ticks), "settled after {ticks} ticks");
    }

    #[test]
    fn release_energy_settles_quickly() {
        let config = RelaxationConfig::default();
        let mut alpha = config.release_energy;
        let mut ticks = 0;
        while alpha > 0.0 {
            alpha = cool(alpha, &config, 1.0);
            ticks += 1;
        }
        assert!(ticks < 250, "settled after {ticks} ticks");
    }
}
