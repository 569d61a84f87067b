use eframe::egui::{self, Align2, RichText};

use super::EguiApp;
use super::style;
use crate::config::API_URL_ENV;
use crate::egui_app::state::DELETE_CONFIRMATION_WORD;

enum SettingsAction {
    SignIn,
    SaveProfile,
    SaveNotifications,
    SignOut,
    OpenDeleteAccount,
    ApplyApiUrl,
}

impl EguiApp {
    pub(super) fn render_settings(&mut self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let user = self.controller.user();
        let mut action = None;
        ui.heading("Settings");
        ui.add_space(12.0);

        let form = &mut self.controller.ui.settings;
        if let Some(error) = &form.error {
            ui.label(RichText::new(error).color(palette.error));
            ui.add_space(8.0);
        }

        style::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Account").strong());
            ui.add_space(6.0);
            ui.add_enabled_ui(!form.account_busy, |ui| match &user {
                None => {
                    ui.label(
                        RichText::new("Paste the access token issued by your RegressLab account.")
                            .color(palette.text_muted),
                    );
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut form.token_input)
                                .password(true)
                                .hint_text("Access token")
                                .desired_width(360.0),
                        );
                        if ui.button("Sign in").clicked() {
                            action = Some(SettingsAction::SignIn);
                        }
                    });
                }
                Some(user) => {
                    egui::Grid::new("settings_profile")
                        .num_columns(2)
                        .spacing(egui::vec2(16.0, 6.0))
                        .show(ui, |ui| {
                            ui.label(RichText::new("Email").color(palette.text_muted));
                            ui.label(user.email.as_deref().unwrap_or("-"));
                            ui.end_row();
                            ui.label(RichText::new("Full name").color(palette.text_muted));
                            ui.add(
                                egui::TextEdit::singleline(&mut form.full_name)
                                    .desired_width(280.0),
                            );
                            ui.end_row();
                            ui.label(RichText::new("Company").color(palette.text_muted));
                            ui.add(
                                egui::TextEdit::singleline(&mut form.company).desired_width(280.0),
                            );
                            ui.end_row();
                        });
                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        if ui.button("Save profile").clicked() {
                            action = Some(SettingsAction::SaveProfile);
                        }
                        if ui.button("Sign out").clicked() {
                            action = Some(SettingsAction::SignOut);
                        }
                    });
                }
            });
            if form.account_busy {
                ui.spinner();
            }
        });

        if user.is_some() {
            ui.add_space(10.0);
            style::card_frame().show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new("Notifications").strong());
                ui.label(
                    RichText::new("Choose what updates you want to receive.")
                        .color(palette.text_muted),
                );
                ui.add_space(6.0);
                ui.add_enabled_ui(!form.account_busy, |ui| {
                    ui.checkbox(&mut form.email_notifications, "Email updates about your projects");
                    ui.checkbox(&mut form.training_alerts, "Alert me when model training completes");
                    ui.add_space(4.0);
                    if ui.button("Save preferences").clicked() {
                        action = Some(SettingsAction::SaveNotifications);
                    }
                });
            });
        }

        ui.add_space(10.0);
        style::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Connection").strong());
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label("API base URL");
                ui.add(egui::TextEdit::singleline(&mut form.api_base_url).desired_width(320.0));
                if ui.button("Apply").clicked() {
                    action = Some(SettingsAction::ApplyApiUrl);
                }
            });
            ui.label(
                RichText::new(format!(
                    "{API_URL_ENV} overrides this value when set at launch."
                ))
                .small()
                .color(palette.text_muted),
            );
        });

        if user.is_some() {
            ui.add_space(10.0);
            style::card_frame()
                .stroke(egui::Stroke::new(1.0, palette.error))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(RichText::new("Danger zone").strong().color(palette.error));
                    ui.label("Deleting your account removes your stored credentials and profile.");
                    if ui
                        .add_enabled(!form.account_busy, egui::Button::new("Delete account"))
                        .clicked()
                    {
                        action = Some(SettingsAction::OpenDeleteAccount);
                    }
                });
        }

        match action {
            Some(SettingsAction::SignIn) => self.controller.sign_in_with_token(),
            Some(SettingsAction::SaveProfile) => self.controller.save_profile(),
            Some(SettingsAction::SaveNotifications) => self.controller.save_notifications(),
            Some(SettingsAction::SignOut) => self.controller.sign_out(),
            Some(SettingsAction::OpenDeleteAccount) => self.controller.open_delete_account(),
            Some(SettingsAction::ApplyApiUrl) => self.controller.apply_api_base_url(),
            None => {}
        }
    }

    pub(super) fn render_delete_account_prompt(&mut self, ctx: &egui::Context) {
        if !self.controller.ui.settings.confirm_delete_open {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.controller.close_delete_account();
            return;
        }
        let palette = style::palette();
        let mut open = true;
        let mut confirmed = false;
        let mut cancelled = false;
        let form = &mut self.controller.ui.settings;
        egui::Window::new("Delete account")
            .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(
                    RichText::new("This permanently deletes your account. It cannot be undone.")
                        .color(palette.error),
                );
                ui.label(format!("Type {DELETE_CONFIRMATION_WORD} to confirm."));
                ui.text_edit_singleline(&mut form.confirm_delete_text);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(form.delete_confirmed(), egui::Button::new("Delete account"))
                        .clicked()
                    {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });
        if confirmed {
            self.controller.delete_account();
        } else if cancelled || !open {
            self.controller.close_delete_account();
        }
    }
}
