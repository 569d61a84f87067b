use eframe::egui::{self, Color32, Frame, Margin, RichText};

use super::EguiApp;
use super::style;
use crate::egui_app::state::StatusTone;
use crate::session::profile;

/// Lines of history shown when hovering the status text.
const HISTORY_PREVIEW: usize = 10;

fn tone_color(tone: StatusTone) -> Color32 {
    let palette = style::palette();
    match tone {
        StatusTone::Idle => palette.raised,
        StatusTone::Busy => palette.accent,
        StatusTone::Info => palette.success,
        StatusTone::Warning => palette.warning,
        StatusTone::Error => palette.error,
    }
}

impl EguiApp {
    pub(super) fn render_status(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::TopBottomPanel::bottom("status_bar")
            .frame(
                Frame::new()
                    .fill(palette.surface)
                    .stroke(style::section_stroke())
                    .inner_margin(Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    self.render_status_message(ui);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        self.render_connection(ui);
                    });
                });
            });
    }

    fn render_status_message(&self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let status = &self.controller.ui.status;
        let (dot, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
        ui.painter()
            .circle(dot.center(), 5.0, tone_color(status.tone), style::inner_border());
        ui.label(RichText::new(status.badge_label()).strong().color(palette.text));
        if self.controller.is_busy() {
            ui.add(egui::Spinner::new().size(12.0));
        }
        ui.separator();
        let text = ui.label(RichText::new(&status.text).color(palette.text));
        if status.history().next().is_some() {
            text.on_hover_ui(|ui| {
                ui.label(RichText::new("Earlier").small().color(palette.text_muted));
                for entry in status.history().take(HISTORY_PREVIEW) {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(entry.tone.label()).small().color(tone_color(entry.tone)));
                        ui.label(RichText::new(&entry.text).color(palette.text_muted));
                    });
                }
            });
        }
    }

    fn render_connection(&self, ui: &mut egui::Ui) {
        let palette = style::palette();
        ui.label(
            RichText::new(self.controller.api_base_url().as_str())
                .small()
                .color(palette.text_muted),
        );
        ui.separator();
        match self.controller.user() {
            Some(user) => ui.label(
                RichText::new(profile::display_name(Some(&user)))
                    .small()
                    .color(palette.success),
            ),
            None => ui.label(RichText::new("Signed out").small().color(palette.warning)),
        };
    }
}
