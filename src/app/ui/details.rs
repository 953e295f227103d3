use eframe::egui::{self, RichText, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Event Details");
        ui.add_space(6.0);

        let Some(selected) = self.selected else {
            ui.label("Select an event on the canvas or from the search results.");
            return;
        };
        let (Some(event), Some(node)) = (
            self.layout.events().get(selected),
            self.layout.nodes().get(selected),
        ) else {
            ui.label("Selected event no longer exists in the layout.");
            return;
        };

        ui.label(RichText::new(event.title.as_str()).strong());
        if !event.date.is_empty() {
            ui.small(event.date.as_str());
        }
        ui.add_space(6.0);

        ui.label(format!("Category: {}", event.category));
        ui.label(format!("Period: {}", event.period));
        ui.label(format!("Kind: {}", event.kind));
        if let Some(location) = &event.location {
            ui.label(format!("Location: {location}"));
        }
        if !event.people.is_empty() {
            ui.label(format!("People: {}", event.people.join(", ")));
        }
        if let Some(image) = &event.image {
            ui.small(format!("Image: {image}"));
        }

        if let Some(description) = &event.description {
            ui.separator();
            egui::ScrollArea::vertical()
                .id_salt("description_scroll")
                .max_height(220.0)
                .show(ui, |ui| {
                    ui.label(description.as_str());
                });
        }

        ui.separator();
        ui.label(RichText::new("Placement").strong());
        ui.label(format!(
            "Resting: {:.1}° at r = {:.1}",
            node.resting_angle.to_degrees(),
            node.resting_radius
        ));
        match &node.cell {
            Some(cell) => {
                ui.label(format!(
                    "Cell: {:.1}°–{:.1}°, r {:.1}–{:.1}",
                    cell.sector.start_angle.to_degrees(),
                    cell.sector.end_angle.to_degrees(),
                    cell.min_radius,
                    cell.max_radius
                ));
            }
            None => {
                ui.colored_label(egui::Color32::from_rgb(220, 90, 90), "Unplaced: no ring or sector");
            }
        }

        ui.separator();
        ui.label(RichText::new("Connections").strong());
        let mut linked = self
            .layout
            .edges()
            .iter()
            .filter_map(|edge| {
                if edge.source == selected {
                    Some(edge.target)
                } else if edge.target == selected {
                    Some(edge.source)
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();
        linked.sort_unstable();
        linked.dedup();

        let unresolved = event
            .connections
            .iter()
            .filter(|title| !self.layout.events().iter().any(|other| &other.title == *title))
            .cloned()
            .collect::<Vec<_>>();

        if linked.is_empty() && unresolved.is_empty() {
            ui.label("No connections.");
        }

        let mut next_selection = None;
        for index in linked {
            let title = self.layout.events()[index].title.as_str();
            if ui.link(title).clicked() {
                next_selection = Some(index);
            }
        }
        for title in unresolved {
            ui.colored_label(egui::Color32::from_gray(140), format!("{title} (not found)"));
        }

        if next_selection.is_some() {
            self.set_selected(next_selection);
        }
    }
}
