//! Static catalogue of trainable models per problem type.

use super::ProblemType;

/// Glyph shown on a model card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelIcon {
    TrendingUp,
    Trees,
    GitBranch,
    Network,
    BarChart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelInfo {
    /// Identifier sent as `model_type`.
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: ModelIcon,
}

const fn model(
    key: &'static str,
    name: &'static str,
    description: &'static str,
    icon: ModelIcon,
) -> ModelInfo {
    ModelInfo {
        key,
        name,
        description,
        icon,
    }
}

const REGRESSION_MODELS: &[ModelInfo] = &[
    model(
        "linear_regression",
        "Linear Regression",
        "Simple linear model for continuous predictions",
        ModelIcon::TrendingUp,
    ),
    model(
        "ridge",
        "Ridge Regression",
        "Linear regression with L2 regularization",
        ModelIcon::TrendingUp,
    ),
    model(
        "lasso",
        "Lasso Regression",
        "Linear regression with L1 regularization",
        ModelIcon::TrendingUp,
    ),
    model(
        "svr",
        "Support Vector Regression",
        "Non-linear regression using support vectors",
        ModelIcon::TrendingUp,
    ),
    model(
        "random_forest",
        "Random Forest",
        "Ensemble of decision trees for robust predictions",
        ModelIcon::Trees,
    ),
    model(
        "gradient_boosting",
        "Gradient Boosting",
        "Sequential ensemble learning method",
        ModelIcon::TrendingUp,
    ),
    model(
        "decision_tree",
        "Decision Tree",
        "Tree-based model for interpretable predictions",
        ModelIcon::GitBranch,
    ),
    model(
        "knn",
        "K-Nearest Neighbors",
        "Instance-based learning algorithm",
        ModelIcon::Network,
    ),
];

const CLASSIFICATION_MODELS: &[ModelInfo] = &[
    model(
        "logistic_regression",
        "Logistic Regression",
        "Linear model for binary/multiclass classification",
        ModelIcon::BarChart,
    ),
    model(
        "svc",
        "Support Vector Classifier",
        "Non-linear classification using support vectors",
        ModelIcon::BarChart,
    ),
    model(
        "random_forest",
        "Random Forest",
        "Ensemble of decision trees for classification",
        ModelIcon::Trees,
    ),
    model(
        "gradient_boosting",
        "Gradient Boosting",
        "Sequential ensemble for classification",
        ModelIcon::BarChart,
    ),
    model(
        "decision_tree",
        "Decision Tree",
        "Tree-based classifier",
        ModelIcon::GitBranch,
    ),
    model(
        "knn",
        "K-Nearest Neighbors",
        "Instance-based classification",
        ModelIcon::Network,
    ),
];

/// Models offered for `problem_type`; empty for auto.
pub fn models_for(problem_type: ProblemType) -> &'static [ModelInfo] {
    match problem_type {
        ProblemType::Regression => REGRESSION_MODELS,
        ProblemType::Classification => CLASSIFICATION_MODELS,
        ProblemType::Auto => &[],
    }
}

pub fn lookup(problem_type: ProblemType, key: &str) -> Option<&'static ModelInfo> {
    models_for(problem_type).iter().find(|info| info.key == key)
}
