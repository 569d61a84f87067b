//! RegressLab dashboard library: API client, session handling, training
//! workflow and the egui desktop front end.

/// HTTP client for the RegressLab API.
pub mod api;
/// Application directory resolution.
pub mod app_dirs;
/// Persisted dashboard settings.
pub mod config;
/// Desktop dashboard built on egui.
pub mod egui_app;
pub(crate) mod http_client;
/// Tracing setup for the binary.
pub mod logging;
/// Identity provider seam and the current session.
pub mod session;
/// Training configuration workflow.
pub mod train;
