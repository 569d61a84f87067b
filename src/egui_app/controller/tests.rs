use std::time::Instant;

use super::jobs::{DatasetsLoadResult, DeleteResult, TargetAnalysisResult};
use super::test_support::{dataset, harness, harness_with, wait_for_jobs};
use super::*;
use crate::api::{ApiError, DeleteResponse};
use crate::config::{AppSettings, DashboardPage};
use crate::http_client::test_server::{json_response, serve_once};
use crate::train::{ProblemType, WizardPhase, directory::SIGN_IN_REQUIRED};

const UNUSED_API: &str = "http://127.0.0.1:9/api";

const TRAINING_BODY: &str = r#"{"status":"success","message":"Model trained","data":{
    "id":"m1","training_time":1.234,
    "metrics":{"r2_score":0.87,"rmse":12.45,"mse":155.0},
    "preprocessing_metadata":{"problem_type":"regression","train_samples":404,"test_samples":102}}}"#;

fn housing() -> Vec<crate::api::Dataset> {
    vec![
        dataset("d1", "2025-03-05T10:00:00Z", &["sqft", "beds", "price"]),
        dataset("d2", "2024-01-01T00:00:00Z", &["a", "b"]),
    ]
}

#[test]
fn incomplete_configuration_raises_error_toast() {
    let mut harness = harness(UNUSED_API, true);
    let controller = &mut harness.controller;
    controller.start_training();
    let toast = controller.ui.toasts.latest().unwrap();
    assert_eq!(toast.title, "Configuration incomplete");
    assert_eq!(toast.tone, NotificationTone::Error);
    assert_eq!(controller.wizard().phase(), WizardPhase::Idle);
    assert!(!controller.jobs.has_pending());
    assert_eq!(controller.ui.status.badge_label(), "Error");
}

#[test]
fn missing_model_blocks_explicit_problem_type() {
    let mut harness = harness(UNUSED_API, true);
    let controller = &mut harness.controller;
    controller.inject_datasets(Ok(housing()));
    controller.select_dataset(Some("d1".into()));
    controller.wizard.select_target(Some("price".into()));
    controller.start_training();
    assert_eq!(
        controller.ui.toasts.latest().map(|toast| toast.title.as_str()),
        Some("Model not selected")
    );
    assert!(!controller.wizard().is_training());
}

#[test]
fn training_round_trip_records_summary() {
    let server = serve_once(json_response(200, "OK", TRAINING_BODY));
    let mut harness = harness(&server.base_url, true);
    let controller = &mut harness.controller;
    controller.inject_datasets(Ok(housing()));
    controller.select_dataset(Some("d1".into()));
    controller.wizard.select_target(Some("price".into()));
    controller.select_model(Some("random_forest".into()));
    controller.set_test_size(0.3);

    controller.start_training_at(Instant::now());
    assert!(controller.wizard().is_training());
    assert!(controller.needs_repaint());
    wait_for_jobs(controller);

    let request = server.request();
    assert!(request.starts_with("POST /train/d1?"));
    assert!(request.contains("model_type=random_forest"));
    assert!(request.to_ascii_lowercase().contains("authorization: bearer tok"));

    let progress = controller.wizard().progress();
    assert!(progress.is_complete());
    assert_eq!(progress.status, "Training completed in 1.23s!");
    let toast = controller.ui.toasts.latest().unwrap();
    assert_eq!(toast.title, "Training completed!");
    assert_eq!(toast.description, "Model trained successfully using regression");

    let summary = controller.ui.last_run.as_ref().unwrap();
    assert_eq!(summary.dataset_name, "d1.csv");
    assert_eq!(summary.model, "Random Forest");
    assert_eq!(summary.target_column, "price");
    assert_eq!(
        summary.metrics,
        [
            ("R² Score".to_string(), "0.8700".to_string()),
            ("RMSE".to_string(), "12.45".to_string()),
        ]
    );
}

#[test]
fn failed_training_surfaces_backend_detail() {
    let server = serve_once(json_response(
        400,
        "Bad Request",
        r#"{"detail":"Target column contains only one class"}"#,
    ));
    let mut harness = harness(&server.base_url, true);
    let controller = &mut harness.controller;
    controller.inject_datasets(Ok(housing()));
    controller.select_dataset(Some("d1".into()));
    controller.wizard.select_target(Some("price".into()));
    controller.set_problem_type(ProblemType::Auto);
    controller.start_training();
    wait_for_jobs(controller);

    assert_eq!(controller.wizard().phase(), WizardPhase::Failed);
    assert!(controller.wizard().progress().is_failed());
    let toast = controller.ui.toasts.latest().unwrap();
    assert_eq!(toast.title, "Training failed");
    assert_eq!(toast.description, "Target column contains only one class");
    assert!(controller.ui.last_run.is_none());
}

#[test]
fn stale_dataset_lists_are_dropped() {
    let mut harness = harness(UNUSED_API, true);
    let controller = &mut harness.controller;
    let old = controller.jobs.next_dataset_request();
    let current = controller.jobs.next_dataset_request();
    controller.handle_datasets_loaded(DatasetsLoadResult {
        request_id: old,
        result: Ok(housing()),
    });
    assert!(controller.directory().datasets().is_empty());
    controller.handle_datasets_loaded(DatasetsLoadResult {
        request_id: current,
        result: Ok(housing()),
    });
    assert_eq!(controller.directory().datasets().len(), 2);
}

#[test]
fn remembered_dataset_is_preselected() {
    let mut settings = AppSettings::default();
    settings.ui.last_dataset = Some("d2".into());
    let mut harness = harness_with(UNUSED_API, true, settings);
    let controller = &mut harness.controller;
    controller.inject_datasets(Ok(housing()));
    assert_eq!(controller.wizard().state().dataset(), Some("d2"));
    assert_eq!(controller.selected_dataset().map(|d| d.name.as_str()), Some("d2.csv"));
}

#[test]
fn selecting_dataset_is_persisted() {
    let mut harness = harness(UNUSED_API, true);
    harness.controller.inject_datasets(Ok(housing()));
    harness.controller.select_dataset(Some("d1".into()));
    let saved = crate::config::load_from(&harness.settings_path()).unwrap();
    assert_eq!(saved.ui.last_dataset.as_deref(), Some("d1"));
}

#[test]
fn deleting_selected_dataset_clears_selection() {
    let mut harness = harness(UNUSED_API, true);
    let controller = &mut harness.controller;
    controller.inject_datasets(Ok(housing()));
    controller.select_dataset(Some("d1".into()));
    controller.request_delete("d1");
    assert_eq!(
        controller.ui.datasets.pending_delete.as_ref().map(|p| p.name.as_str()),
        Some("d1.csv")
    );
    controller.ui.datasets.pending_delete = None;
    controller.handle_dataset_deleted(DeleteResult {
        dataset_id: "d1".into(),
        result: Ok(DeleteResponse {
            message: "Dataset deleted successfully".into(),
        }),
    });
    assert_eq!(controller.wizard().state().dataset(), None);
    assert!(controller.directory().find("d1").is_none());
    assert_eq!(controller.settings().ui.last_dataset, None);
    assert_eq!(
        controller.ui.toasts.latest().map(|toast| toast.title.as_str()),
        Some("Dataset deleted")
    );
}

#[test]
fn failed_delete_keeps_dataset() {
    let mut harness = harness(UNUSED_API, true);
    let controller = &mut harness.controller;
    controller.inject_datasets(Ok(housing()));
    controller.handle_dataset_deleted(DeleteResult {
        dataset_id: "d1".into(),
        result: Err(ApiError::Status {
            status: 404,
            message: "Dataset not found".into(),
        }),
    });
    assert!(controller.directory().find("d1").is_some());
    let toast = controller.ui.toasts.latest().unwrap();
    assert_eq!(toast.title, "Delete failed");
    assert_eq!(toast.description, "Dataset not found");
}

#[test]
fn upload_requires_session() {
    let mut harness = harness(UNUSED_API, false);
    let controller = &mut harness.controller;
    controller.upload_dataset("housing.csv".into());
    assert!(controller.ui.datasets.uploading.is_none());
    assert!(!controller.jobs.has_pending());
    assert_eq!(
        controller.ui.toasts.latest().map(|toast| toast.description.as_str()),
        Some("Please sign in to upload datasets")
    );
}

#[test]
fn stale_analysis_does_not_touch_status() {
    let mut harness = harness(UNUSED_API, true);
    let controller = &mut harness.controller;
    controller.inject_datasets(Ok(housing()));
    controller.select_dataset(Some("d1".into()));
    let first = controller.wizard.select_target(Some("beds".into())).unwrap();
    let second = controller.wizard.select_target(Some("price".into())).unwrap();
    let status_before = controller.ui.status.text.clone();
    controller.handle_target_analyzed(TargetAnalysisResult {
        ticket: first,
        result: Ok(crate::train::analyzer::analysis_for("beds", ProblemType::Classification)),
    });
    assert_eq!(controller.ui.status.text, status_before);
    controller.handle_target_analyzed(TargetAnalysisResult {
        ticket: second,
        result: Ok(crate::train::analyzer::analysis_for("price", ProblemType::Regression)),
    });
    assert_eq!(controller.ui.status.text, "price looks like a regression target");
    assert_eq!(
        controller.wizard().analyzer().analysis().map(|a| a.target_column.as_str()),
        Some("price")
    );
}

#[test]
fn sign_out_resets_wizard_and_requires_sign_in() {
    let mut harness = harness(UNUSED_API, true);
    let controller = &mut harness.controller;
    controller.inject_datasets(Ok(housing()));
    controller.select_dataset(Some("d1".into()));
    controller.sign_out();
    wait_for_jobs(controller);

    assert!(!controller.is_signed_in());
    assert_eq!(controller.wizard().state().dataset(), None);
    assert_eq!(controller.directory().error(), Some(SIGN_IN_REQUIRED));
    assert!(!controller.ui.settings.account_busy);
    assert_eq!(
        controller.ui.toasts.latest().map(|toast| toast.title.as_str()),
        Some("Signed out")
    );
}

#[test]
fn token_sign_in_updates_profile_form() {
    let mut harness = harness(UNUSED_API, false);
    let controller = &mut harness.controller;
    controller.sign_in_with_token();
    assert_eq!(
        controller.ui.settings.error.as_deref(),
        Some("Paste an access token to sign in")
    );

    controller.ui.settings.token_input = "  fresh-token ".into();
    controller.sign_in_with_token();
    // The sign-in triggers a dataset load against an unreachable API.
    wait_for_jobs(controller);
    assert!(controller.is_signed_in());
    assert!(controller.ui.settings.token_input.is_empty());
    assert!(
        controller
            .ui
            .toasts
            .items()
            .any(|toast| toast.title == "Signed in" && toast.description == "Welcome, ada@example.com")
    );

    controller.ui.settings.full_name = "Ada Lovelace".into();
    controller.save_profile();
    wait_for_jobs(controller);
    assert_eq!(controller.ui.settings.full_name, "Ada Lovelace");
    assert_eq!(
        crate::session::profile::display_name(controller.user().as_ref()),
        "Ada Lovelace"
    );
}

#[test]
fn notification_toggles_patch_user_metadata() {
    let mut harness = harness(UNUSED_API, true);
    let controller = &mut harness.controller;
    controller.ui.settings.load_profile(controller.user().as_ref());
    assert!(controller.ui.settings.email_notifications);
    assert!(controller.ui.settings.training_alerts);

    controller.ui.settings.training_alerts = false;
    controller.save_notifications();
    wait_for_jobs(controller);
    let user = controller.user().unwrap();
    assert_eq!(user.metadata["email_notifications"], serde_json::json!(true));
    assert_eq!(user.metadata["training_alerts"], serde_json::json!(false));
    assert!(!controller.ui.settings.training_alerts);
    assert!(
        controller
            .ui
            .toasts
            .items()
            .any(|toast| toast.title == "Preferences saved")
    );
}

#[test]
fn account_deletion_needs_confirmation_word() {
    let mut harness = harness(UNUSED_API, true);
    let controller = &mut harness.controller;
    controller.open_delete_account();
    controller.ui.settings.confirm_delete_text = "nope".into();
    controller.delete_account();
    assert!(!controller.jobs.has_pending());
    assert!(controller.is_signed_in());

    controller.ui.settings.confirm_delete_text = "DELETE".into();
    controller.delete_account();
    wait_for_jobs(controller);
    assert!(!controller.is_signed_in());
    assert!(!controller.ui.settings.confirm_delete_open);
}

#[test]
fn navigation_is_remembered() {
    let mut harness = harness(UNUSED_API, true);
    harness.controller.navigate(DashboardPage::Train);
    assert_eq!(harness.controller.ui.page, DashboardPage::Train);
    let saved = crate::config::load_from(&harness.settings_path()).unwrap();
    assert_eq!(saved.ui.last_page, DashboardPage::Train);
}

#[test]
fn invalid_api_url_is_rejected() {
    let mut harness = harness(UNUSED_API, true);
    let controller = &mut harness.controller;
    controller.ui.settings.api_base_url = "ftp://example.com".into();
    controller.apply_api_base_url();
    assert!(controller.ui.settings.error.as_deref().unwrap().contains("unsupported scheme"));
    assert_eq!(controller.api_base_url().as_str(), UNUSED_API);
}
