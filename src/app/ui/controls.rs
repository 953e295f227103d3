use eframe::egui::{self, Key, Response, Ui};

use crate::config::AngularAnchor;
use crate::layout::Diagnostic;
use crate::util::short_label;

use super::super::ViewModel;

const SLIDER_KEY_BASE_RATE: f32 = 10.0;
const SLIDER_KEY_ACCEL_PER_SEC: f32 = 9.0;
const SLIDER_KEY_ACCEL_MAX: f32 = 40.0;
const SEARCH_RESULT_ROWS: usize = 40;

#[derive(Clone, Copy, Default)]
struct SliderKeyHoldState {
    positive_secs: f32,
    negative_secs: f32,
}

fn slider_key_accel_multiplier(hold_secs: f32) -> f32 {
    let ramp = hold_secs * SLIDER_KEY_ACCEL_PER_SEC;
    (1.0 + ramp + ramp * ramp * 0.15).min(SLIDER_KEY_ACCEL_MAX)
}

/// Arrow keys nudge a focused slider, accelerating while held.
fn apply_slider_arrow_acceleration(
    ui: &Ui,
    response: &Response,
    value: &mut f32,
    min: f32,
    max: f32,
) -> bool {
    let state_id = response.id.with("arrow_key_hold_state");
    let mut hold_state = ui.ctx().data(|data| {
        data.get_temp::<SliderKeyHoldState>(state_id)
            .unwrap_or_default()
    });

    if !response.has_focus() {
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, SliderKeyHoldState::default()));
        return false;
    }

    let (delta_time, increase_down, decrease_down) = ui.input(|input| {
        (
            input.stable_dt.min(0.1),
            input.key_down(Key::ArrowRight) || input.key_down(Key::ArrowUp),
            input.key_down(Key::ArrowLeft) || input.key_down(Key::ArrowDown),
        )
    });

    hold_state.positive_secs = if increase_down { hold_state.positive_secs + delta_time } else { 0.0 };
    hold_state.negative_secs = if decrease_down { hold_state.negative_secs + delta_time } else { 0.0 };
    ui.ctx()
        .data_mut(|data| data.insert_temp(state_id, hold_state));

    let direction = (increase_down as i8) - (decrease_down as i8);
    if direction == 0 {
        return false;
    }

    let hold_secs = if direction > 0 {
        hold_state.positive_secs
    } else {
        hold_state.negative_secs
    };
    let step = ((max - min) / 200.0).max(0.0005);
    let speed = SLIDER_KEY_BASE_RATE * slider_key_accel_multiplier(hold_secs);

    let old_value = *value;
    *value = (*value + direction as f32 * step * speed * delta_time).clamp(min, max);
    ui.ctx().request_repaint();
    (*value - old_value).abs() > f32::EPSILON
}

fn tuning_slider(
    ui: &mut Ui,
    value: &mut f32,
    range: std::ops::RangeInclusive<f32>,
    text: &str,
    hover: &str,
) -> bool {
    let (min, max) = (*range.start(), *range.end());
    let slider = ui
        .add(
            egui::Slider::new(&mut *value, range)
                .text(text)
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text(hover);
    if slider.hovered() {
        slider.request_focus();
    }
    let changed = slider.changed();
    changed | apply_slider_arrow_acceleration(ui, &slider, value, min, max)
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Layout Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search events")
            .on_hover_text("Fuzzy-highlight events by title.");
        ui.text_edit_singleline(&mut self.search);
        self.draw_search_results(ui);

        ui.separator();

        ui.checkbox(&mut self.live_physics, "Live relaxation")
            .on_hover_text("Advance the simulation every frame. Dragged nodes still settle back into their sector when paused.");
        ui.checkbox(&mut self.show_sector_guides, "Sector guides")
            .on_hover_text("Draw period dividers and labels inside each ring.");
        ui.checkbox(&mut self.show_edges, "Connections")
            .on_hover_text("Draw edges between connected events.");

        let holding_node = self.layout.phase().dragged_node().is_some();
        if ui
            .add_enabled(!holding_node, egui::Button::new("Reheat"))
            .on_hover_text("Restart relaxation at full energy.")
            .clicked()
        {
            self.layout.reheat();
        }

        let mut changed = false;
        ui.collapsing("Relaxation tuning", |ui| {
            let relaxation = self.layout.relaxation_mut();

            changed |= tuning_slider(
                ui,
                &mut relaxation.radial_strength,
                0.0..=1.0,
                "Radial pin",
                "Pull toward each node's resting radius.",
            );
            changed |= tuning_slider(
                ui,
                &mut relaxation.angular_strength,
                0.0..=0.5,
                "Angular pin",
                "Pull toward the node's anchor angle.",
            );
            ui.horizontal(|ui| {
                ui.label("Anchor");
                changed |= ui
                    .selectable_value(
                        &mut relaxation.angular_anchor,
                        AngularAnchor::SectorMidpoint,
                        "Sector midpoint",
                    )
                    .changed();
                changed |= ui
                    .selectable_value(
                        &mut relaxation.angular_anchor,
                        AngularAnchor::RestingAngle,
                        "Resting angle",
                    )
                    .changed();
            });
            changed |= tuning_slider(
                ui,
                &mut relaxation.repulsion_strength,
                -120.0..=0.0,
                "Repulsion",
                "Negative values push nodes apart.",
            );
            changed |= tuning_slider(
                ui,
                &mut relaxation.collision_strength,
                0.0..=1.0,
                "Collision",
                "How firmly overlapping discs are separated.",
            );
            changed |= tuning_slider(
                ui,
                &mut relaxation.velocity_decay,
                0.05..=0.9,
                "Velocity decay",
                "Fraction of velocity lost per tick.",
            );

            ui.separator();
            changed |= ui
                .checkbox(&mut relaxation.link_attraction, "Link attraction")
                .on_hover_text("Pull connected events toward a rest length.")
                .changed();
            ui.add_enabled_ui(relaxation.link_attraction, |ui| {
                changed |= tuning_slider(
                    ui,
                    &mut relaxation.link_strength,
                    0.0..=0.3,
                    "Link strength",
                    "Spring stiffness along each connection.",
                );
                changed |= tuning_slider(
                    ui,
                    &mut relaxation.link_rest_length,
                    10.0..=300.0,
                    "Link rest length",
                    "Preferred distance between connected events.",
                );
            });
        });

        if changed && !holding_node && self.layout.energy() < 0.3 {
            self.layout.reheat();
        }

        ui.separator();
        self.draw_diagnostics(ui);
    }

    fn draw_search_results(&mut self, ui: &mut Ui) {
        let Some(matches) = self.search_matches() else {
            return;
        };
        if matches.is_empty() {
            ui.small("No matching events.");
            return;
        }

        let mut ordered = matches.iter().copied().collect::<Vec<_>>();
        ordered.sort_by(|a, b| self.layout.events()[*a].title.cmp(&self.layout.events()[*b].title));
        ui.small(format!("{} matches", ordered.len()));

        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("search_results_scroll")
            .max_height(180.0)
            .show(ui, |ui| {
                for index in ordered.into_iter().take(SEARCH_RESULT_ROWS) {
                    let event = &self.layout.events()[index];
                    let label = short_label(&event.title, 40).into_owned();
                    if ui
                        .selectable_label(self.selected == Some(index), label)
                        .on_hover_text(format!("{} / {}", event.category, event.period))
                        .clicked()
                    {
                        picked = Some(index);
                    }
                }
            });

        if picked.is_some() {
            self.set_selected(picked);
        }
    }

    fn draw_diagnostics(&self, ui: &mut Ui) {
        let diagnostics = self.layout.diagnostics();
        ui.label(egui::RichText::new("Diagnostics").strong());
        ui.label(format!("Unresolved connections: {}", diagnostics.unresolved_links()));
        ui.label(format!("Unplaced events: {}", diagnostics.unplaced_nodes()));
        ui.collapsing(format!("Sectors: {}", self.layout.sectors().len()), |ui| {
            let sectors = self.layout.sectors();
            for category in sectors.categories() {
                ui.small(format!("{category}: {}", sectors.periods(category).join(", ")));
            }
        });

        if diagnostics.is_empty() {
            return;
        }
        ui.collapsing("Details", |ui| {
            egui::ScrollArea::vertical()
                .id_salt("diagnostics_scroll")
                .max_height(200.0)
                .show(ui, |ui| {
                    for entry in diagnostics.entries() {
                        ui.small(self.describe_diagnostic(entry));
                    }
                });
        });
    }

    fn describe_diagnostic(&self, entry: &Diagnostic) -> String {
        let title = |id: usize| {
            self.layout
                .events()
                .get(id)
                .map(|event| event.title.as_str())
                .unwrap_or("?")
        };
        match entry {
            Diagnostic::UnresolvedLink { source, title: target } => {
                format!("{} → missing \"{target}\"", title(*source))
            }
            Diagnostic::Unplaced { node, reason } => {
                format!("{}: {reason}", title(*node))
            }
        }
    }
}
