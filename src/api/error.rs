use serde_json::Value;

/// Failure of a call through [`super::ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response; `message` is the most specific text the body offered.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("{0}")]
    Io(String),
    /// The worker thread running the call panicked.
    #[error("Background task failed: {0}")]
    Crashed(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_status_body(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            message: error_message(status, body),
        }
    }
}

/// Best-effort message from an error body: `detail`, then `message`, then a
/// generic line naming the status.
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body.trim())
        .ok()
        .and_then(|value| detail_text(&value).or_else(|| string_field(&value, "message")))
        .unwrap_or_else(|| format!("Request failed: {status}"))
}

fn detail_text(value: &Value) -> Option<String> {
    match value.get("detail")? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        // Validation failures arrive as a list of {loc, msg, type} objects.
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str).or(item.as_str()))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        Value::Object(_) => string_field(value.get("detail")?, "message"),
        _ => None,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}
