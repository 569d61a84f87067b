//! Entry point for the RegressLab desktop dashboard.
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]
use eframe::egui;
use egui::viewport::IconData;
use regresslab::egui_app::ui::{EguiApp, MIN_VIEWPORT_SIZE};
use regresslab::logging;

const ICON_SIZE: u32 = 32;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match logging::init() {
        Ok(log_file) => tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            log_file = %log_file.display(),
            "Starting RegressLab"
        ),
        Err(err) => eprintln!("Logging disabled: {err}"),
    }

    let viewport = egui::ViewportBuilder::default()
        .with_title("RegressLab")
        .with_min_inner_size(MIN_VIEWPORT_SIZE)
        .with_inner_size(egui::vec2(1280.0, 820.0))
        .with_icon(app_icon());

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "RegressLab",
        native_options,
        Box::new(|_cc| match EguiApp::new() {
            Ok(app) => Ok(Box::new(app)),
            Err(err) => {
                tracing::error!("Startup failed: {err}");
                Ok(Box::new(LaunchError { message: err }))
            }
        }),
    )?;
    Ok(())
}

/// Window icon: a rising bar chart drawn into an RGBA buffer.
fn app_icon() -> IconData {
    let background = [10u8, 10, 12, 255];
    let bar = [167u8, 217, 255, 255];
    let mut rgba = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let column = x / 8;
            let height = 8 + column * 6;
            let in_bar = x % 8 >= 2 && x % 8 <= 6 && y >= ICON_SIZE - 2 - height && y < ICON_SIZE - 2;
            rgba.extend_from_slice(if in_bar { &bar } else { &background });
        }
    }
    IconData {
        rgba,
        width: ICON_SIZE,
        height: ICON_SIZE,
    }
}

/// Minimal fallback app to display initialization errors.
struct LaunchError {
    message: String,
}

impl eframe::App for LaunchError {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Failed to start RegressLab");
                ui.label(&self.message);
            });
        });
    }
}
