//! Constrained radial layout: category rings, period sectors, resting placement, and the
//! relaxation/drag loop that keeps every node inside its cell.

pub mod constraint;
mod diagnostics;
mod drag;
pub mod geometry;
mod links;
mod physics;
mod placement;
mod rings;
mod sectors;


use eframe::egui::Vec2;
use serde::Serialize;

use crate::config::{ConfigError, LayoutConfig, RelaxationConfig};
use crate::events::{EventRecord, NodeKind};

pub use diagnostics::{Diagnostic, Diagnostics, UnplacedReason};
pub use drag::{DragPhase, InteractionEvent};
pub use links::Edge;
pub use placement::Cell;
pub use rings::RingTable;
pub use sectors::SectorTable;

use physics::PhysicsScratch;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("`{title}` has a non-finite resting position (angle {angle}, radius {radius})")]
    NonFiniteGeometry {
        title: String,
        angle: f32,
        radius: f32,
    },
}

/// One event on the canvas. `id` is the event's index in data order.
#[derive(Clone, Debug)]
pub struct LayoutNode {
    pub id: usize,
    pub category: String,
    pub kind: NodeKind,
    pub resting_angle: f32,
    pub resting_radius: f32,
    /// `None` when the node could not be placed; projection then leaves it alone.
    pub cell: Option<Cell>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub dragging: bool,
    pub was_dragged: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct FrameSnapshot {
    pub energy: f32,
    pub phase: DragPhase,
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NodeSnapshot {
    pub id: usize,
    pub title: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct EdgeSnapshot {
    pub source: usize,
    pub target: usize,
    pub from: [f32; 2],
    pub to: [f32; 2],
}

pub struct LayoutState {
    events: Vec<EventRecord>,
    nodes: Vec<LayoutNode>,
    edges: Vec<Edge>,
    edge_endpoints: Vec<(Vec2, Vec2)>,
    sectors: SectorTable,
    rings: RingTable,
    config: LayoutConfig,
    energy: f32,
    phase: DragPhase,
    diagnostics: Diagnostics,
    scratch: PhysicsScratch,
}

impl LayoutState {
    pub fn new(events: Vec<EventRecord>, config: LayoutConfig) -> Result<Self, LayoutError> {
        config.validate()?;

        let mut diagnostics = Diagnostics::default();
        let sectors = sectors::partition(
            events
                .iter()
                .map(|event| (event.category.as_str(), event.period.as_str())),
        );
        let rings = RingTable::build(&config, events.iter().map(|event| event.category.as_str()));
        let placements =
            placement::place_nodes(&events, &sectors, &rings, config.placement, &mut diagnostics);

        let mut nodes = Vec::with_capacity(events.len());
        for (id, (event, placement)) in events.iter().zip(placements).enumerate() {
            if !(placement.resting_angle.is_finite() && placement.resting_radius.is_finite()) {
                return Err(LayoutError::NonFiniteGeometry {
                    title: event.title.clone(),
                    angle: placement.resting_angle,
                    radius: placement.resting_radius,
                });
            }

            nodes.push(LayoutNode {
                id,
                category: event.category.clone(),
                kind: event.kind,
                resting_angle: placement.resting_angle,
                resting_radius: placement.resting_radius,
                cell: placement.cell,
                position: geometry::polar(placement.resting_angle, placement.resting_radius),
                velocity: Vec2::ZERO,
                dragging: false,
                was_dragged: false,
            });
        }

        let edges = links::resolve_links(&events, &mut diagnostics);
        tracing::info!(
            nodes = nodes.len(),
            edges = edges.len(),
            sectors = sectors.len(),
            diagnostics = diagnostics.entries().len(),
            "layout constructed"
        );

        let mut state = Self {
            events,
            nodes,
            edges,
            edge_endpoints: Vec::new(),
            sectors,
            rings,
            config,
            energy: 1.0,
            phase: DragPhase::Idle,
            diagnostics,
            scratch: PhysicsScratch::default(),
        };
        state.refresh_edge_endpoints();
        Ok(state)
    }

    /// Advances the simulation by `delta_seconds` of wall time.
    pub fn tick(&mut self, delta_seconds: f32) {
        let time_scale = physics::time_scale(delta_seconds);
        let relaxation = self.config.relaxation;

        if self.energy > 0.0 {
            physics::integrate(
                &mut self.nodes,
                &self.edges,
                &relaxation,
                self.energy,
                time_scale,
                &mut self.scratch,
            );
        }
        physics::project_all(&mut self.nodes);
        self.refresh_edge_endpoints();

        if self.energy > 0.0 {
            self.energy = physics::cool(self.energy, &relaxation, time_scale);
            if self.energy == 0.0 {
                for node in &mut self.nodes {
                    node.velocity = Vec2::ZERO;
                }
                let outside = self
                    .nodes
                    .iter()
                    .filter(|node| {
                        node.cell
                            .as_ref()
                            .is_some_and(|cell| !constraint::is_inside(node.position, cell))
                    })
                    .count();
                tracing::debug!(outside, "layout settled");
            }
        }
        if self.energy == 0.0 && self.phase == DragPhase::Settling {
            self.phase = DragPhase::Idle;
        }
    }

    pub fn handle(&mut self, event: InteractionEvent) {
        drag::apply(
            &mut self.phase,
            event,
            &mut self.nodes,
            &mut self.energy,
            self.config.relaxation.release_energy,
        );
    }

    /// Whether a click on `node` counts as a selection; swallows the click that ends a drag.
    pub fn consume_click(&mut self, node: usize) -> bool {
        drag::consume_click(&mut self.nodes, node)
    }

    /// Restores full energy. Ignored while a node is held so the rest of the layout stays frozen.
    pub fn reheat(&mut self) {
        if self.phase.dragged_node().is_some() {
            tracing::debug!("reheat ignored during drag");
            return;
        }
        self.energy = 1.0;
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            energy: self.energy,
            phase: self.phase,
            nodes: self
                .nodes
                .iter()
                .map(|node| NodeSnapshot {
                    id: node.id,
                    title: self.events[node.id].title.clone(),
                    x: node.position.x,
                    y: node.position.y,
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .zip(&self.edge_endpoints)
                .map(|(edge, (from, to))| EdgeSnapshot {
                    source: edge.source,
                    target: edge.target,
                    from: [from.x, from.y],
                    to: [to.x, to.y],
                })
                .collect(),
        }
    }

    fn refresh_edge_endpoints(&mut self) {
        self.edge_endpoints.clear();
        self.edge_endpoints.extend(
            self.edges
                .iter()
                .map(|edge| (self.nodes[edge.source].position, self.nodes[edge.target].position)),
        );
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_endpoints(&self) -> &[(Vec2, Vec2)] {
        &self.edge_endpoints
    }

    pub fn sectors(&self) -> &SectorTable {
        &self.sectors
    }

    pub fn rings(&self) -> &RingTable {
        &self.rings
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_settled(&self) -> bool {
        self.energy == 0.0 && self.phase.dragged_node().is_none()
    }

    /// True from pointer-down until a released node has been reconciled with its cell.
    /// Hosts keep ticking in this window even when ambient relaxation is paused.
    pub fn is_interacting(&self) -> bool {
        self.phase != DragPhase::Idle
    }

    /// Live tuning from the viewer. Ring and placement settings are fixed for the session.
    pub fn relaxation_mut(&mut self) -> &mut RelaxationConfig {
        &mut self.config.relaxation
    }
}
