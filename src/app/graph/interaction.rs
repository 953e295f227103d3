use eframe::egui::{self, Pos2, Rect, Ui};

use crate::layout::InteractionEvent;

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.05, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Feeds primary-button presses, moves and releases into the layout's drag controller.
    ///
    /// Works from raw pointer state rather than egui's drag/click split so that a press that
    /// never moves still ends in a click, and a press that moves ends in a suppressed one.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        let (pressed, released, moved, pointer) = ui.input(|input| {
            (
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                input.pointer.delta() != egui::Vec2::ZERO,
                input.pointer.interact_pos(),
            )
        });

        if pressed
            && response.hovered()
            && let (Some(node), Some(pointer)) = (hovered, pointer)
        {
            let grab = screen_to_world(rect, self.pan, self.zoom, pointer);
            self.drag_offset = self.layout.nodes()[node].position - grab;
            self.layout.handle(InteractionEvent::PointerDown { node });
        }

        let Some(node) = self.layout.phase().dragged_node() else {
            if released && response.hovered() && hovered.is_none() {
                self.set_selected(None);
            }
            return;
        };

        if moved && let Some(pointer) = pointer {
            let world = screen_to_world(rect, self.pan, self.zoom, pointer) + self.drag_offset;
            self.layout.handle(InteractionEvent::PointerMove {
                x: world.x,
                y: world.y,
            });
        }

        if released {
            self.layout.handle(InteractionEvent::PointerUp);
            if self.layout.consume_click(node) {
                self.set_selected(Some(node));
            }
        }
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        visible_indices
            .iter()
            .filter_map(|&index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index] + 2.0).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}
