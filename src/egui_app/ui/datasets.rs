use eframe::egui::{self, Align2, RichText};

use super::EguiApp;
use super::style;
use crate::api::{NOT_AVAILABLE, format_upload_date};
use crate::config::DashboardPage;

enum DatasetAction {
    Upload,
    Refresh,
    Train(String),
    Delete(String),
}

impl EguiApp {
    pub(super) fn render_datasets(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let mut action = None;
        let signed_in = self.controller.is_signed_in();
        let page = &self.controller.ui.datasets;
        let directory = self.controller.directory();

        ui.horizontal(|ui| {
            ui.heading("Datasets");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let upload_label = match &page.uploading {
                    Some(name) => format!("Uploading {name}..."),
                    None => "Upload CSV".to_string(),
                };
                if ui
                    .add_enabled(signed_in && page.uploading.is_none(), egui::Button::new(upload_label))
                    .clicked()
                {
                    action = Some(DatasetAction::Upload);
                }
                if ui
                    .add_enabled(!directory.is_loading(), egui::Button::new("Refresh"))
                    .clicked()
                {
                    action = Some(DatasetAction::Refresh);
                }
                if directory.is_loading() || page.uploading.is_some() {
                    ui.spinner();
                }
            });
        });
        ui.add_space(8.0);

        if let Some(error) = directory.error() {
            ui.label(RichText::new(error).color(palette.error));
            ui.add_space(8.0);
        }

        if directory.datasets().is_empty() {
            if !directory.is_loading() && directory.error().is_none() {
                style::card_frame().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(
                        RichText::new("No datasets yet. Upload a CSV file to get started.")
                            .color(palette.text_muted),
                    );
                });
            }
        } else {
            style::card_frame().show(ui, |ui| {
                egui::Grid::new("datasets_table")
                    .num_columns(6)
                    .striped(true)
                    .spacing(egui::vec2(18.0, 8.0))
                    .show(ui, |ui| {
                        for header in ["Name", "Rows", "Columns", "Quality", "Uploaded", ""] {
                            ui.label(RichText::new(header).strong().color(palette.text_muted));
                        }
                        ui.end_row();
                        for dataset in directory.datasets() {
                            ui.label(RichText::new(&dataset.name).strong());
                            ui.label(dataset.rows_label());
                            ui.label(dataset.columns_label());
                            match dataset.has_missing {
                                Some(true) => {
                                    ui.label(RichText::new("Missing values").color(palette.warning))
                                }
                                Some(false) => {
                                    ui.label(RichText::new("Complete").color(palette.success))
                                }
                                None => ui.label(RichText::new(NOT_AVAILABLE).color(palette.text_muted)),
                            };
                            ui.label(format_upload_date(&dataset.uploaded_at));
                            ui.horizontal(|ui| {
                                if ui.button("Train").clicked() {
                                    action = Some(DatasetAction::Train(dataset.id.clone()));
                                }
                                let deleting = page.deleting.as_deref() == Some(dataset.id.as_str());
                                if ui
                                    .add_enabled(!deleting, egui::Button::new("Delete"))
                                    .clicked()
                                {
                                    action = Some(DatasetAction::Delete(dataset.id.clone()));
                                }
                            });
                            ui.end_row();
                        }
                    });
            });
        }

        match action {
            Some(DatasetAction::Upload) => self.controller.pick_and_upload_dataset(),
            Some(DatasetAction::Refresh) => self.controller.refresh_datasets(),
            Some(DatasetAction::Train(id)) => {
                self.controller.select_dataset(Some(id));
                self.controller.navigate(DashboardPage::Train);
            }
            Some(DatasetAction::Delete(id)) => self.controller.request_delete(&id),
            None => {}
        }
    }

    pub(super) fn render_delete_dataset_prompt(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.controller.ui.datasets.pending_delete.clone() else {
            return;
        };
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.controller.cancel_delete();
            return;
        }
        let palette = style::palette();
        let mut open = true;
        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Delete dataset")
            .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(format!("Delete \"{}\"?", pending.name));
                ui.label(
                    RichText::new("The file and its trained models are removed permanently.")
                        .color(palette.warning),
                );
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });
        if confirmed {
            self.controller.confirm_delete();
        } else if cancelled || !open {
            self.controller.cancel_delete();
        }
    }
}
