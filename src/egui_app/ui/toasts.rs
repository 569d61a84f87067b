use eframe::egui::{self, Align2, Frame, Margin, RichText, Stroke};

use super::EguiApp;
use super::style;

const TOAST_WIDTH: f32 = 320.0;

impl EguiApp {
    pub(super) fn render_toasts(&mut self, ctx: &egui::Context) {
        if self.controller.ui.toasts.is_empty() {
            return;
        }
        let palette = style::palette();
        let mut dismissed = None;
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(Align2::RIGHT_TOP, egui::vec2(-16.0, 16.0))
            .order(egui::Order::Foreground)
            .interactable(true)
            .show(ctx, |ui| {
                ui.set_width(TOAST_WIDTH);
                for toast in self.controller.ui.toasts.items() {
                    let accent = style::tone_color(toast.tone);
                    Frame::new()
                        .fill(palette.surface)
                        .stroke(Stroke::new(1.0, accent))
                        .inner_margin(Margin::same(10))
                        .show(ui, |ui| {
                            ui.set_width(TOAST_WIDTH);
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(&toast.title).strong().color(accent));
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        if ui.small_button("x").clicked() {
                                            dismissed = Some(toast.id);
                                        }
                                    },
                                );
                            });
                            if !toast.description.is_empty() {
                                ui.label(
                                    RichText::new(&toast.description).color(palette.text),
                                );
                            }
                        });
                    ui.add_space(6.0);
                }
            });
        if let Some(id) = dismissed {
            self.controller.dismiss_toast(id);
        }
    }
}
