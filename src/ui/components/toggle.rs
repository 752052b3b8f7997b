// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Toggle switch for boolean fields (adapted from the egui demo).

use eframe::egui;

/// Animated on/off switch. Clicking flips the bound flag and marks the response changed.
pub struct Toggle<'a> {
    on: &'a mut bool,
}

impl<'a> Toggle<'a> {
    pub fn new(on: &'a mut bool) -> Self {
        Self { on }
    }
}

impl egui::Widget for Toggle<'_> {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let spacing = ui.style().spacing.interact_size;
        let desired_size = egui::vec2(spacing.x.max(32.0), spacing.y.max(18.0));
        let (rect, mut response) = ui.allocate_exact_size(desired_size, egui::Sense::click());
        if response.clicked() {
            *self.on = !*self.on;
            response.mark_changed();
        }

        if ui.is_rect_visible(rect) {
            let how_on = ui.ctx().animate_bool(response.id, *self.on);
            let visuals = ui.style().interact_selectable(&response, *self.on);
            let off = ui.visuals().widgets.inactive.bg_fill;
            let fill = off.lerp_to_gamma(visuals.bg_fill, how_on);
            let radius = rect.height() * 0.45;
            ui.painter()
                .rect_filled(rect.expand(visuals.expansion), radius, fill);

            let knob_x = egui::lerp((rect.left() + radius)..=(rect.right() - radius), how_on);
            let center = egui::pos2(knob_x, rect.center().y);
            ui.painter()
                .circle(center, radius * 0.75, visuals.bg_fill, visuals.fg_stroke);
        }

        response
    }
}
