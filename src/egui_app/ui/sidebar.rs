use eframe::egui::{self, Frame, Margin, RichText, StrokeKind};

use super::EguiApp;
use super::style;
use crate::config::DashboardPage;
use crate::session::profile;

const SIDEBAR_WIDTH: f32 = 190.0;

const NAV_ITEMS: [(DashboardPage, &str); 4] = [
    (DashboardPage::Overview, "Overview"),
    (DashboardPage::Datasets, "Datasets"),
    (DashboardPage::Train, "Train Model"),
    (DashboardPage::Settings, "Settings"),
];

impl EguiApp {
    pub(super) fn render_sidebar(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        let mut target = None;
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .default_width(SIDEBAR_WIDTH)
            .frame(
                Frame::new()
                    .fill(palette.surface)
                    .stroke(style::section_stroke())
                    .inner_margin(Margin::symmetric(10, 12)),
            )
            .show(ctx, |ui| {
                ui.label(
                    RichText::new("RegressLab")
                        .size(20.0)
                        .strong()
                        .color(palette.accent),
                );
                ui.label(RichText::new("Model training dashboard").color(palette.text_muted));
                ui.add_space(16.0);
                for (page, label) in NAV_ITEMS {
                    let selected = self.controller.ui.page == page;
                    if ui
                        .selectable_label(selected, RichText::new(label).size(15.0))
                        .clicked()
                    {
                        target = Some(page);
                    }
                    ui.add_space(4.0);
                }
                ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                    self.render_user_badge(ui);
                });
            });
        if let Some(page) = target {
            self.controller.navigate(page);
        }
    }

    fn render_user_badge(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let user = self.controller.user();
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(32.0, 32.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 0.0, palette.accent_dim);
            ui.painter()
                .rect_stroke(rect, 0.0, style::inner_border(), StrokeKind::Inside);
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                profile::initials(user.as_ref()),
                egui::FontId::proportional(13.0),
                palette.text,
            );
            ui.vertical(|ui| {
                ui.label(RichText::new(profile::display_name(user.as_ref())).strong());
                let caption = match &user {
                    Some(user) => user.email.clone().unwrap_or_default(),
                    None => "Not signed in".to_string(),
                };
                ui.label(RichText::new(caption).small().color(palette.text_muted));
            });
        });
    }
}
