use std::path::Path;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::layout::{DragPhase, LayoutState};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(layout: LayoutState) -> Self {
        // Fit the outermost ring into a typical canvas on first show.
        let outer = layout.rings().outer_radius().max(1.0);
        let zoom = (380.0 / outer).clamp(0.05, 6.0);

        Self {
            layout,
            search: String::new(),
            selected: None,
            pan: Vec2::ZERO,
            zoom,
            live_physics: true,
            show_sector_guides: true,
            show_edges: true,
            drag_offset: Vec2::ZERO,
            search_match_cache: None,
            visible_node_count: 0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        events_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("epoch-rings");
                    ui.separator();
                    ui.label(format!("events: {}", events_path.display()));
                    ui.label(format!("nodes: {}", self.layout.nodes().len()));
                    ui.label(format!("edges: {}", self.layout.edges().len()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload events"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.status_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading events...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    fn status_text(&self) -> String {
        let phase = match self.layout.phase() {
            DragPhase::Idle if self.layout.is_settled() => "settled",
            DragPhase::Idle => "relaxing",
            DragPhase::Dragging { .. } => "dragging",
            DragPhase::Settling => "settling",
        };
        format!(
            "{phase}  |  energy {:.3}  |  visible {}",
            self.layout.energy(),
            self.visible_node_count
        )
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<usize>) {
        if self.selected == selected {
            return;
        }
        if let Some(id) = selected {
            tracing::debug!(node = id, "selected event");
        }
        self.selected = selected;
    }
}
