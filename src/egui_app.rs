//! egui desktop dashboard: controller, UI state and renderer.

pub mod controller;
pub mod state;
pub mod ui;
