//! Training configuration wizard page.

use eframe::egui::{self, RichText};

use super::EguiApp;
use super::style;
use crate::config::DashboardPage;
use crate::train::{
    MAX_CV_FOLDS, MAX_TEST_SIZE, MIN_CV_FOLDS, MIN_TEST_SIZE, MetricFamily, ModelIcon, ProblemType,
    TEST_SIZE_STEP, TrainingWizard, registry,
};

const NO_DATASETS: &str = "No datasets found. Please upload a dataset first from the Datasets page.";
const AUTO_MODE_NOTE: &str = "In Auto Mode, the system will evaluate multiple models and select the one with the best performance on your dataset.";
const MISSING_VALUES_NOTE: &str =
    "This dataset contains missing values. They will be handled automatically during preprocessing.";

enum TrainAction {
    Dataset(Option<String>),
    Target(Option<String>),
    ProblemType(ProblemType),
    Model(String),
    TestSize(f64),
    Seed(u64),
    CrossValidation(bool),
    Folds(u32),
    Start,
    OpenDatasets,
}

fn icon_glyph(icon: ModelIcon) -> &'static str {
    match icon {
        ModelIcon::TrendingUp => "📈",
        ModelIcon::Trees => "🌳",
        ModelIcon::GitBranch => "🔀",
        ModelIcon::Network => "🕸",
        ModelIcon::BarChart => "📊",
    }
}

fn test_size_label(test_size: f64) -> String {
    format!("Test Size: {}%", (test_size * 100.0).round() as u32)
}

impl EguiApp {
    pub(super) fn render_train(&mut self, ui: &mut egui::Ui) {
        let mut actions = Vec::new();
        ui.heading("Train Model");
        ui.label(
            RichText::new("Choose a dataset and target, pick a model and start training.")
                .color(style::palette().text_muted),
        );
        ui.add_space(12.0);
        ui.columns(2, |columns| {
            self.render_train_form(&mut columns[0], &mut actions);
            self.render_train_summary(&mut columns[1], &mut actions);
        });
        for action in actions {
            match action {
                TrainAction::Dataset(id) => self.controller.select_dataset(id),
                TrainAction::Target(column) => self.controller.select_target(column),
                TrainAction::ProblemType(problem_type) => {
                    self.controller.set_problem_type(problem_type)
                }
                TrainAction::Model(key) => self.controller.select_model(Some(key)),
                TrainAction::TestSize(value) => self.controller.set_test_size(value),
                TrainAction::Seed(seed) => self.controller.set_random_seed(seed),
                TrainAction::CrossValidation(enabled) => {
                    self.controller.set_cross_validation(enabled)
                }
                TrainAction::Folds(folds) => self.controller.set_cv_folds(folds),
                TrainAction::Start => self.controller.start_training(),
                TrainAction::OpenDatasets => self.controller.navigate(DashboardPage::Datasets),
            }
        }
    }

    fn render_train_form(&self, ui: &mut egui::Ui, actions: &mut Vec<TrainAction>) {
        let wizard = self.controller.wizard();
        let locked = wizard.is_training();
        ui.add_enabled_ui(!locked, |ui| {
            self.render_data_selection(ui, actions);
            ui.add_space(10.0);
            render_analysis(ui, wizard);
            ui.add_space(10.0);
            render_problem_type(ui, wizard, actions);
            ui.add_space(10.0);
            render_model_grid(ui, wizard, actions);
            ui.add_space(10.0);
            render_config(ui, wizard, actions);
        });
    }

    fn render_data_selection(&self, ui: &mut egui::Ui, actions: &mut Vec<TrainAction>) {
        let palette = style::palette();
        let directory = self.controller.directory();
        let state = self.controller.wizard().state();
        style::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("1. Select data").strong());
            ui.add_space(6.0);
            if directory.is_loading() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading datasets...");
                });
                return;
            }
            if let Some(error) = directory.error() {
                ui.label(RichText::new(error).color(palette.error));
                return;
            }
            if directory.datasets().is_empty() {
                ui.label(RichText::new(NO_DATASETS).color(palette.text_muted));
                if ui.button("Go to Datasets").clicked() {
                    actions.push(TrainAction::OpenDatasets);
                }
                return;
            }

            let selected = self.controller.selected_dataset();
            ui.label("Dataset");
            egui::ComboBox::from_id_salt("train_dataset")
                .width(ui.available_width())
                .selected_text(
                    selected
                        .map(|dataset| dataset.name.as_str())
                        .unwrap_or("Select a dataset"),
                )
                .show_ui(ui, |ui| {
                    for dataset in directory.datasets() {
                        let is_selected = state.dataset() == Some(dataset.id.as_str());
                        let label = format!(
                            "{}  ({} rows x {} cols)",
                            dataset.name,
                            dataset.rows_label(),
                            dataset.columns_label()
                        );
                        if ui.selectable_label(is_selected, label).clicked() && !is_selected {
                            actions.push(TrainAction::Dataset(Some(dataset.id.clone())));
                        }
                    }
                });
            let Some(dataset) = selected else {
                return;
            };
            ui.label(RichText::new(dataset.shape_label()).color(palette.text_muted));
            if dataset.has_missing == Some(true) {
                ui.label(RichText::new(MISSING_VALUES_NOTE).color(palette.warning));
            }

            ui.add_space(6.0);
            ui.label("Target column");
            let columns = directory.available_columns(state.dataset());
            egui::ComboBox::from_id_salt("train_target")
                .width(ui.available_width())
                .selected_text(state.target_column().unwrap_or("Select the column to predict"))
                .show_ui(ui, |ui| {
                    for column in &columns {
                        let is_selected = state.target_column() == Some(column.as_str());
                        if ui.selectable_label(is_selected, column).clicked() && !is_selected {
                            actions.push(TrainAction::Target(Some(column.clone())));
                        }
                    }
                });
            if columns.is_empty() {
                ui.label(
                    RichText::new("This dataset has no column metadata yet.")
                        .color(palette.text_muted),
                );
            }
        });
    }

    fn render_train_summary(&self, ui: &mut egui::Ui, actions: &mut Vec<TrainAction>) {
        let palette = style::palette();
        let wizard = self.controller.wizard();
        let state = wizard.state();
        style::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Summary").strong());
            ui.add_space(6.0);
            let dataset_name = self
                .controller
                .selected_dataset()
                .map(|dataset| dataset.name.as_str())
                .unwrap_or("-");
            let model_name = match state.problem_type() {
                ProblemType::Auto => ProblemType::Auto.label(),
                problem_type => state
                    .selected_model()
                    .and_then(|key| registry::lookup(problem_type, key))
                    .map(|info| info.name)
                    .unwrap_or("-"),
            };
            let split = format!(
                "{}% train / {}% test",
                ((1.0 - state.test_size()) * 100.0).round() as u32,
                (state.test_size() * 100.0).round() as u32
            );
            let validation = if state.cross_validation() {
                format!("{}-fold cross validation", state.cv_folds())
            } else {
                "Hold-out split".to_string()
            };
            egui::Grid::new("train_summary")
                .num_columns(2)
                .spacing(egui::vec2(16.0, 6.0))
                .show(ui, |ui| {
                    let rows = [
                        ("Dataset", dataset_name.to_string()),
                        ("Target", state.target_column().unwrap_or("-").to_string()),
                        ("Problem type", state.problem_type().label().to_string()),
                        ("Model", model_name.to_string()),
                        ("Split", split),
                        ("Validation", validation),
                        ("Random seed", state.random_seed().to_string()),
                    ];
                    for (label, value) in rows {
                        ui.label(RichText::new(label).color(palette.text_muted));
                        ui.label(value);
                        ui.end_row();
                    }
                });
            ui.add_space(10.0);
            let label = if wizard.is_training() {
                "Training..."
            } else {
                "Start Training"
            };
            let button = egui::Button::new(RichText::new(label).strong())
                .min_size(egui::vec2(ui.available_width(), 32.0));
            if ui.add_enabled(wizard.can_start(), button).clicked() {
                actions.push(TrainAction::Start);
            }
        });
        ui.add_space(10.0);
        render_progress(ui, wizard);
    }
}

fn render_analysis(ui: &mut egui::Ui, wizard: &TrainingWizard) {
    let palette = style::palette();
    let analyzer = wizard.analyzer();
    if !analyzer.is_analyzing() && analyzer.analysis().is_none() {
        return;
    }
    style::card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new("Target analysis").strong());
        ui.add_space(6.0);
        if analyzer.is_analyzing() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Analyzing target column...");
            });
            return;
        }
        let Some(analysis) = analyzer.analysis() else {
            return;
        };
        ui.horizontal(|ui| {
            ui.label("Recommended:");
            ui.label(
                RichText::new(analysis.recommended_problem_type.label())
                    .strong()
                    .color(palette.accent),
            );
        });
        let stats = &analysis.statistics;
        ui.label(
            RichText::new(format!(
                "{} samples, {} unique values ({:.1}%), dtype {}",
                stats.n_samples,
                stats.n_unique,
                stats.unique_ratio * 100.0,
                if stats.dtype.is_empty() { "unknown" } else { stats.dtype.as_str() }
            ))
            .color(palette.text_muted),
        );
        if !analysis.recommendations.message.is_empty() {
            ui.label(&analysis.recommendations.message);
        }
        for warning in &analysis.warnings {
            ui.label(RichText::new(&warning.message).color(style::severity_color(warning.severity)));
        }
        if let Some(mismatch) = wizard.mismatch() {
            ui.add_space(6.0);
            style::card_frame()
                .stroke(egui::Stroke::new(1.0, palette.warning))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(RichText::new("Problem type mismatch").strong().color(palette.warning));
                    ui.label(mismatch.message());
                });
        }
    });
}

fn render_problem_type(ui: &mut egui::Ui, wizard: &TrainingWizard, actions: &mut Vec<TrainAction>) {
    let palette = style::palette();
    let current = wizard.state().problem_type();
    style::card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new("2. Problem type").strong());
        ui.add_space(6.0);
        ui.columns(ProblemType::ALL.len(), |columns| {
            for (column, problem_type) in columns.iter_mut().zip(ProblemType::ALL) {
                let frame = if problem_type == current {
                    style::selected_card_frame()
                } else {
                    style::card_frame()
                };
                let response = frame
                    .show(column, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new(problem_type.label()).strong());
                        ui.label(
                            RichText::new(problem_type.description()).color(palette.text_muted),
                        );
                    })
                    .response
                    .interact(egui::Sense::click());
                if response.clicked() && problem_type != current {
                    actions.push(TrainAction::ProblemType(problem_type));
                }
            }
        });
    });
}

fn render_model_grid(ui: &mut egui::Ui, wizard: &TrainingWizard, actions: &mut Vec<TrainAction>) {
    let palette = style::palette();
    let state = wizard.state();
    style::card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new("3. Model").strong());
        ui.add_space(6.0);
        if state.problem_type() == ProblemType::Auto {
            ui.label(RichText::new(AUTO_MODE_NOTE).color(palette.text_muted));
            return;
        }
        let models = registry::models_for(state.problem_type());
        for pair in models.chunks(2) {
            ui.columns(2, |columns| {
                for (column, info) in columns.iter_mut().zip(pair) {
                    let selected = state.selected_model() == Some(info.key);
                    let frame = if selected {
                        style::selected_card_frame()
                    } else {
                        style::card_frame()
                    };
                    let response = frame
                        .show(column, |ui| {
                            ui.set_width(ui.available_width());
                            ui.label(
                                RichText::new(format!("{} {}", icon_glyph(info.icon), info.name))
                                    .strong(),
                            );
                            ui.label(RichText::new(info.description).color(palette.text_muted));
                        })
                        .response
                        .interact(egui::Sense::click());
                    if response.clicked() && !selected {
                        actions.push(TrainAction::Model(info.key.to_string()));
                    }
                }
            });
            ui.add_space(4.0);
        }
    });
}

fn render_config(ui: &mut egui::Ui, wizard: &TrainingWizard, actions: &mut Vec<TrainAction>) {
    let palette = style::palette();
    let state = wizard.state();
    style::card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new("4. Configuration").strong());
        ui.add_space(6.0);

        let mut test_size = state.test_size();
        ui.label(test_size_label(test_size));
        if ui
            .add(
                egui::Slider::new(&mut test_size, MIN_TEST_SIZE..=MAX_TEST_SIZE)
                    .step_by(TEST_SIZE_STEP)
                    .show_value(false),
            )
            .changed()
        {
            actions.push(TrainAction::TestSize(test_size));
        }

        ui.add_space(6.0);
        let mut seed = state.random_seed();
        ui.horizontal(|ui| {
            ui.label("Random seed");
            if ui.add(egui::DragValue::new(&mut seed).speed(1)).changed() {
                actions.push(TrainAction::Seed(seed));
            }
        });

        ui.add_space(6.0);
        let mut cross_validation = state.cross_validation();
        if ui
            .checkbox(&mut cross_validation, "Use cross validation")
            .changed()
        {
            actions.push(TrainAction::CrossValidation(cross_validation));
        }
        if state.cross_validation() {
            let mut folds = state.cv_folds();
            ui.label(format!("Number of Folds: {folds}"));
            if ui
                .add(egui::Slider::new(&mut folds, MIN_CV_FOLDS..=MAX_CV_FOLDS).show_value(false))
                .changed()
            {
                actions.push(TrainAction::Folds(folds));
            }
        } else {
            ui.label(
                RichText::new("Evaluation uses a single train/test split.")
                    .color(palette.text_muted),
            );
        }
    });
}

fn render_progress(ui: &mut egui::Ui, wizard: &TrainingWizard) {
    let palette = style::palette();
    let progress = wizard.progress();
    style::card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new("Progress").strong());
        ui.add_space(6.0);
        ui.add(
            egui::ProgressBar::new(f32::from(progress.progress) / 100.0)
                .text(format!("{}%", progress.progress)),
        );
        let status_color = if progress.is_failed() {
            palette.error
        } else if progress.is_complete() {
            palette.success
        } else {
            palette.text
        };
        ui.horizontal(|ui| {
            if progress.is_training {
                ui.spinner();
            }
            ui.label(RichText::new(&progress.status).color(status_color));
        });
        let metrics = progress.displayed_metrics();
        if metrics.is_empty() {
            return;
        }
        ui.add_space(8.0);
        let heading = match progress.metric_family() {
            Some(MetricFamily::Classification) => "Classification metrics",
            _ => "Regression metrics",
        };
        ui.label(RichText::new(heading).color(palette.text_muted));
        egui::Grid::new("train_metrics")
            .num_columns(2)
            .spacing(egui::vec2(16.0, 4.0))
            .show(ui, |ui| {
                for (name, value) in metrics {
                    ui.label(name.label());
                    ui.label(RichText::new(name.format(value)).strong().color(palette.success));
                    ui.end_row();
                }
            });
    });
}
