//! Minimal `multipart/form-data` encoder for single-file uploads.

use base64::Engine;

/// Encoded form body plus the matching `Content-Type` header value.
#[derive(Clone, Debug)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    /// Form with one file part named `field`.
    pub fn single_file(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        let boundary = random_boundary();
        let mut body = Vec::with_capacity(data.len() + 256);
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                escape_quoted(field),
                escape_quoted(file_name)
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        Self { boundary, body }
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Content type advertised for an uploaded file name.
pub fn content_type_for(file_name: &str) -> &'static str {
    if file_name.to_ascii_lowercase().ends_with(".csv") {
        "text/csv"
    } else {
        "application/octet-stream"
    }
}

fn random_boundary() -> String {
    use rand::Rng;
    let mut bytes = [0u8; 18];
    rand::rng().fill(&mut bytes);
    format!(
        "regresslab-{}",
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    )
}

fn escape_quoted(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            '"' => "%22".to_string(),
            '\r' | '\n' => " ".to_string(),
            other => other.to_string(),
        })
        .collect()
}
