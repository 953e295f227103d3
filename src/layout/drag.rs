use eframe::egui::vec2;
use serde::Serialize;

use super::LayoutNode;

/// Pointer input already mapped into layout coordinates by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InteractionEvent {
    PointerDown { node: usize },
    PointerMove { x: f32, y: f32 },
    PointerUp,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging {
        node: usize,
        moved: bool,
    },
    Settling,
}

impl DragPhase {
    pub fn dragged_node(self) -> Option<usize> {
        match self {
            Self::Dragging { node, .. } => Some(node),
            _ => None,
        }
    }
}

/// Applies one pointer event. `energy` is the relaxation energy owned by the caller.
pub(super) fn apply(
    phase: &mut DragPhase,
    event: InteractionEvent,
    nodes: &mut [LayoutNode],
    energy: &mut f32,
    release_energy: f32,
) {
    match event {
        InteractionEvent::PointerDown { node } => {
            if let DragPhase::Dragging { node: active, .. } = *phase {
                tracing::debug!(node, active, "ignoring pointer down during another drag");
                return;
            }
            if node >= nodes.len() {
                tracing::debug!(node, "ignoring pointer down on unknown node");
                return;
            }

            *energy = 0.0;
            for other in nodes.iter_mut() {
                other.velocity = eframe::egui::Vec2::ZERO;
            }
            let grabbed = &mut nodes[node];
            grabbed.dragging = true;
            grabbed.was_dragged = false;
            *phase = DragPhase::Dragging { node, moved: false };
            tracing::debug!(node, "drag started");
        }
        InteractionEvent::PointerMove { x, y } => {
            let DragPhase::Dragging { node, moved } = phase else {
                return;
            };
            if !(x.is_finite() && y.is_finite()) {
                return;
            }
            nodes[*node].position = vec2(x, y);
            *moved = true;
        }
        InteractionEvent::PointerUp => {
            let DragPhase::Dragging { node, moved } = *phase else {
                return;
            };
            let released = &mut nodes[node];
            released.dragging = false;
            released.was_dragged = moved;
            *energy = release_energy;
            *phase = DragPhase::Settling;
            tracing::debug!(node, moved, "drag released");
        }
    }
}

/// Whether a click on `node` should select it. A drag that actually moved the node swallows
/// the click that ends it.
pub(super) fn consume_click(nodes: &mut [LayoutNode], node: usize) -> bool {
    let Some(clicked) = nodes.get_mut(node) else {
        return false;
    };
    if clicked.was_dragged {
        clicked.was_dragged = false;
        return false;
    }
    true
}
