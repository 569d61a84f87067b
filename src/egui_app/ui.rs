//! egui renderer for the dashboard.

mod datasets;
mod overview;
mod settings;
mod sidebar;
mod status_bar;
pub mod style;
mod toasts;
mod train;

use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui::{self, Frame, Margin};

use crate::config::{self, DashboardPage};
use crate::egui_app::controller::EguiController;
use crate::session::{Account, LocalIdentity, SessionHandle};

/// Smallest window the dashboard layout supports.
pub const MIN_VIEWPORT_SIZE: egui::Vec2 = egui::vec2(960.0, 640.0);
/// Repaint cadence while something is in flight.
const ACTIVE_REPAINT: Duration = Duration::from_millis(100);

/// Renders the dashboard using egui.
pub struct EguiApp {
    controller: EguiController,
    visuals_set: bool,
}

impl EguiApp {
    /// Create the app with the persisted configuration and stored session.
    pub fn new() -> Result<Self, String> {
        let settings_path =
            config::config_path().map_err(|err| format!("Failed to locate config: {err}"))?;
        let settings = config::load_from(&settings_path)
            .map_err(|err| format!("Failed to load config: {err}"))?;
        let provider =
            LocalIdentity::new().map_err(|err| format!("Failed to open credential store: {err}"))?;
        let account = Account::new(Arc::new(provider), SessionHandle::new());
        let mut controller = EguiController::new(settings, settings_path, account)
            .map_err(|err| format!("Invalid configuration: {err}"))?;
        controller.restore_session();
        Ok(Self::with_controller(controller))
    }

    pub fn with_controller(controller: EguiController) -> Self {
        Self {
            controller,
            visuals_set: false,
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        style::apply_visuals(&mut visuals);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }

    fn render_page(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::CentralPanel::default()
            .frame(
                Frame::new()
                    .fill(palette.page)
                    .inner_margin(Margin::same(16)),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt(("page_scroll", self.controller.ui.page))
                    .auto_shrink([false, false])
                    .show(ui, |ui| match self.controller.ui.page {
                        DashboardPage::Overview => self.render_overview(ui),
                        DashboardPage::Datasets => self.render_datasets(ui),
                        DashboardPage::Train => self.render_train(ui),
                        DashboardPage::Settings => self.render_settings(ui),
                    });
            });
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_visuals(ctx);
        let busy = self.controller.update_frame(Instant::now());
        self.render_sidebar(ctx);
        self.render_status(ctx);
        self.render_page(ctx);
        self.render_delete_dataset_prompt(ctx);
        self.render_delete_account_prompt(ctx);
        self.render_toasts(ctx);
        if busy {
            ctx.request_repaint_after(ACTIVE_REPAINT);
        }
    }
}
