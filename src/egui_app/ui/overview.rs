use eframe::egui::{self, RichText};

use super::EguiApp;
use super::style;
use crate::api::format_upload_date;
use crate::config::DashboardPage;
use crate::session::profile;

impl EguiApp {
    pub(super) fn render_overview(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let user = self.controller.user();
        ui.heading(format!("Welcome back, {}", profile::display_name(user.as_ref())));
        ui.label(
            RichText::new("Upload data, train models and review results.")
                .color(palette.text_muted),
        );
        ui.add_space(12.0);

        let mut target = None;
        ui.columns(3, |columns| {
            style::card_frame().show(&mut columns[0], |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new("Datasets").color(palette.text_muted));
                let directory = self.controller.directory();
                let count = if directory.is_loading() {
                    "...".to_string()
                } else {
                    directory.datasets().len().to_string()
                };
                ui.label(RichText::new(count).size(28.0).strong());
                if ui.link("Manage datasets").clicked() {
                    target = Some(DashboardPage::Datasets);
                }
            });
            style::card_frame().show(&mut columns[1], |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new("Latest dataset").color(palette.text_muted));
                match self.controller.directory().latest() {
                    Some(dataset) => {
                        ui.label(RichText::new(&dataset.name).size(18.0).strong());
                        ui.label(dataset.shape_label());
                        ui.label(
                            RichText::new(format_upload_date(&dataset.uploaded_at))
                                .color(palette.text_muted),
                        );
                    }
                    None => {
                        ui.label(RichText::new("Nothing uploaded yet").color(palette.text_muted));
                    }
                }
            });
            style::card_frame().show(&mut columns[2], |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new("Last training run").color(palette.text_muted));
                match &self.controller.ui.last_run {
                    Some(run) => {
                        ui.label(RichText::new(&run.model).size(18.0).strong());
                        ui.label(format!("{} -> {}", run.dataset_name, run.target_column));
                        ui.label(
                            RichText::new(format!(
                                "{} in {:.2}s",
                                run.problem_type,
                                run.training_time.as_secs_f64()
                            ))
                            .color(palette.text_muted),
                        );
                        for (label, value) in &run.metrics {
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(label).color(palette.text_muted));
                                ui.label(RichText::new(value).strong().color(palette.success));
                            });
                        }
                    }
                    None => {
                        ui.label(RichText::new("No runs this session").color(palette.text_muted));
                        if ui.link("Train a model").clicked() {
                            target = Some(DashboardPage::Train);
                        }
                    }
                }
            });
        });

        if !self.controller.is_signed_in() {
            ui.add_space(12.0);
            style::card_frame().show(ui, |ui| {
                ui.label(
                    RichText::new("You are not signed in. Paste an access token on the Settings page to load your datasets.")
                        .color(palette.warning),
                );
                if ui.button("Open settings").clicked() {
                    target = Some(DashboardPage::Settings);
                }
            });
        }

        if let Some(page) = target {
            self.controller.navigate(page);
        }
    }
}
