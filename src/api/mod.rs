//! API Gateway Client: authenticated JSON calls against the RegressLab API.

mod datasets;
mod error;
mod multipart;
mod training;

pub use datasets::{
    Dataset, DatasetMetadata, DeleteResponse, NOT_AVAILABLE, UploadResponse, format_upload_date,
};
pub use error::{ApiError, error_message};
pub use multipart::{MultipartForm, content_type_for};
pub use training::{
    AnalysisWarning, BackendMetrics, PreprocessingMetadata, ProblemRecommendations,
    TargetAnalysis, TargetStatistics, TrainingOutcome, TrainingRequest, TrainingResponse,
    WarningSeverity,
};

use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::http_client;
use crate::session::SessionHandle;

/// HTTP verbs used by the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// Path below the API base plus query pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Endpoint {
    segments: Vec<String>,
    trailing_slash: bool,
    query: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Keep a trailing `/` (collection routes like `/datasets/`).
    pub fn with_trailing_slash(mut self) -> Self {
        self.trailing_slash = true;
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Resolve against `base`, percent-encoding each segment and pair.
    pub fn resolve(&self, base: &Url) -> Result<Url, ApiError> {
        let mut url = base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidEndpoint(format!("{base} cannot be a base URL")))?;
            path.pop_if_empty();
            path.extend(self.segments.iter().map(String::as_str));
            if self.trailing_slash {
                path.push("");
            }
        }
        url.set_query(None);
        if !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

/// Request payload.
#[derive(Clone, Debug, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

#[derive(Clone, Debug)]
pub struct RequestOptions {
    pub method: Method,
    /// Applied after the defaults, so they can override them.
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::with_method(Method::Get)
    }

    pub fn post() -> Self {
        Self::with_method(Method::Post)
    }

    pub fn delete() -> Self {
        Self::with_method(Method::Delete)
    }

    fn with_method(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json<T: Serialize>(mut self, payload: &T) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(payload).map_err(|err| ApiError::Decode(err.to_string()))?;
        self.body = Body::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Body::Multipart(form);
        self
    }
}

/// Cloneable client; each call reads the current token from the session.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: Url,
    session: SessionHandle,
}

impl ApiClient {
    pub fn new(base_url: Url, session: SessionHandle) -> Self {
        Self { base_url, session }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Perform one request and decode the JSON response.
    ///
    /// No retries: the training submission in particular must not repeat.
    pub fn call<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = endpoint.resolve(&self.base_url)?;
        let method = options.method.as_str();
        tracing::debug!("{method} {url}");
        let mut request = http_client::agent()
            .request_url(method, &url)
            .set("Accept", "application/json");
        request = match &options.body {
            Body::Multipart(form) => request.set("Content-Type", &form.content_type()),
            Body::Empty | Body::Json(_) => request.set("Content-Type", "application/json"),
        };
        if let Some(token) = self.session.access_token() {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        for (name, value) in &options.headers {
            request = request.set(name, value);
        }
        let result = match &options.body {
            Body::Empty => request.call(),
            Body::Json(value) => request.send_bytes(value.to_string().as_bytes()),
            Body::Multipart(form) => request.send_bytes(form.body()),
        };
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let err = ApiError::from_status_body(status, &http_client::error_body_text(response));
                tracing::debug!("{method} {url} failed with {status}: {err}");
                return Err(err);
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(ApiError::Transport(err.to_string()));
            }
        };
        let bytes =
            http_client::read_body(response).map_err(|err| ApiError::Decode(err.to_string()))?;
        let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::session::{Session, User};

    pub(crate) fn client(base_url: &str, token: Option<&str>) -> ApiClient {
        let session = match token {
            Some(token) => SessionHandle::with_session(Session {
                access_token: token.to_string(),
                user: User {
                    id: "user-1".into(),
                    email: Some("ada@example.com".into()),
                    metadata: Default::default(),
                },
                expires_at: None,
            }),
            None => SessionHandle::new(),
        };
        ApiClient::new(Url::parse(base_url).unwrap(), session)
    }
}
