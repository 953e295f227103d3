use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::events::NodeKind;
use crate::layout::geometry::polar;
use crate::util::short_label;

use super::super::render_utils::{
    blend_color, category_color, circle_visible, dim_color, draw_background, edge_visible,
    node_radius, ring_fill, world_to_screen,
};
use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

struct ScreenNodes {
    positions: Vec<Pos2>,
    radii: Vec<f32>,
    visible: Vec<usize>,
}

impl ViewModel {
    fn screen_nodes(&self, rect: Rect) -> ScreenNodes {
        let radius_scale = self.zoom.powf(0.6);
        let mut screen = ScreenNodes {
            positions: Vec::with_capacity(self.layout.nodes().len()),
            radii: Vec::with_capacity(self.layout.nodes().len()),
            visible: Vec::new(),
        };
        for node in self.layout.nodes() {
            let position = world_to_screen(rect, self.pan, self.zoom, node.position);
            let radius = (node_radius(node.kind) * radius_scale).clamp(2.5, 40.0);
            if circle_visible(rect, position, radius) {
                screen.visible.push(node.id);
            }
            screen.positions.push(position);
            screen.radii.push(radius);
        }
        screen
    }

    pub(in crate::app) fn search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .layout
            .events()
            .iter()
            .enumerate()
            .filter(|(_, event)| fuzzy_match_score(&matcher, &event.title, query).is_some())
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let before_tick = self.screen_nodes(rect);
        let hovered = Self::hovered_index(
            ui,
            &before_tick.visible,
            &before_tick.positions,
            &before_tick.radii,
        );
        self.handle_node_drag(ui, rect, &response, hovered);

        let dragging = self.layout.phase().dragged_node().is_some();
        if self.live_physics || self.layout.is_interacting() {
            let frame_delta_seconds = ui
                .ctx()
                .input(|input| input.stable_dt)
                .clamp(1.0 / 240.0, 1.0 / 20.0);
            self.layout.tick(frame_delta_seconds);
        }
        if (self.live_physics && !self.layout.is_settled()) || self.layout.is_interacting() {
            ui.ctx().request_repaint();
        }

        if dragging {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grabbing);
        } else if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grab);
        }

        draw_background(&painter, rect, self.pan, self.zoom);
        self.draw_rings(&painter, rect);

        let matches = self.search_matches();
        let search_active = matches.as_ref().is_some_and(|matches| !matches.is_empty());
        let screen = self.screen_nodes(rect);
        self.visible_node_count = screen.visible.len();

        if self.show_edges {
            let zoom_sqrt = self.zoom.sqrt();
            for (edge, (from, to)) in self.layout.edges().iter().zip(self.layout.edge_endpoints()) {
                let start = world_to_screen(rect, self.pan, self.zoom, *from);
                let end = world_to_screen(rect, self.pan, self.zoom, *to);
                if !edge_visible(rect, start, end, 2.5) {
                    continue;
                }

                let touches_selection = self
                    .selected
                    .is_some_and(|id| edge.source == id || edge.target == id);
                let stroke = if touches_selection {
                    Stroke::new((2.4 * zoom_sqrt).clamp(1.2, 4.2), Color32::from_rgb(241, 146, 94))
                } else {
                    Stroke::new(
                        (1.0 * zoom_sqrt).clamp(0.5, 2.6),
                        Color32::from_rgba_unmultiplied(150, 150, 150, 90),
                    )
                };
                painter.line_segment([start, end], stroke);
            }
        }

        let selected_color = Color32::from_rgb(245, 206, 93);
        for &index in &screen.visible {
            let node = &self.layout.nodes()[index];
            let event = &self.layout.events()[index];
            let position = screen.positions[index];
            let radius = screen.radii[index];

            let is_selected = self.selected == Some(index);
            let is_hovered = hovered == Some(index);
            let is_match = matches.as_ref().is_some_and(|matches| matches.contains(&index));

            let base_color = category_color(&node.category);
            let color = if is_selected {
                selected_color
            } else if is_hovered || node.dragging {
                Color32::from_rgb(255, 164, 101)
            } else if is_match {
                blend_color(base_color, Color32::from_rgb(103, 196, 255), 0.68)
            } else if search_active {
                dim_color(base_color, 0.38)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, color);
            let outline = match node.kind {
                NodeKind::Major => 2.2,
                _ => 1.0,
            };
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(outline, Color32::from_rgba_unmultiplied(15, 15, 15, 200)),
            );
            if node.cell.is_none() {
                painter.circle_stroke(
                    position,
                    radius + 3.0,
                    Stroke::new(1.0, Color32::from_rgb(220, 90, 90)),
                );
            }

            let draw_label =
                is_selected || is_hovered || is_match || node.dragging || self.zoom > 1.4;
            if draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    short_label(&event.title, 32),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(index) = hovered {
            let event = &self.layout.events()[index];
            let mut panel_text = format!("{}  |  {} / {}", event.title, event.category, event.period);
            if !event.date.is_empty() {
                panel_text.push_str(&format!("  |  {}", event.date));
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }

    fn draw_rings(&self, painter: &egui::Painter, rect: Rect) {
        let origin = world_to_screen(rect, self.pan, self.zoom, Vec2::ZERO);
        let guide = Stroke::new(1.0, Color32::from_rgba_unmultiplied(120, 130, 145, 110));

        for ring in self.layout.rings().iter() {
            let mid = ring.midpoint() * self.zoom;
            let width = ring.width() * self.zoom;
            painter.circle_stroke(origin, mid, Stroke::new(width, ring_fill(&ring.category)));
            painter.circle_stroke(origin, ring.outer * self.zoom, guide);

            painter.text(
                world_to_screen(rect, self.pan, self.zoom, polar(-std::f32::consts::FRAC_PI_2, ring.outer))
                    + vec2(0.0, 4.0),
                Align2::CENTER_TOP,
                &ring.category,
                FontId::proportional(13.0),
                category_color(&ring.category),
            );

            if !self.show_sector_guides {
                continue;
            }
            let sectors = self.layout.sectors().sectors_for(&ring.category);
            if sectors.len() > 1 {
                for sector in sectors {
                    let inner = world_to_screen(
                        rect,
                        self.pan,
                        self.zoom,
                        polar(sector.start_angle, ring.inner),
                    );
                    let outer = world_to_screen(
                        rect,
                        self.pan,
                        self.zoom,
                        polar(sector.start_angle, ring.outer),
                    );
                    painter.line_segment([inner, outer], guide);
                }
            }
            if self.zoom > 0.6 {
                for sector in sectors {
                    let anchor = world_to_screen(
                        rect,
                        self.pan,
                        self.zoom,
                        polar(sector.midpoint(), ring.inner + ring.width() * 0.12),
                    );
                    painter.text(
                        anchor,
                        Align2::CENTER_CENTER,
                        short_label(&sector.period, 18),
                        FontId::proportional(10.5),
                        Color32::from_rgba_unmultiplied(200, 205, 215, 150),
                    );
                }
            }
        }
    }
}
