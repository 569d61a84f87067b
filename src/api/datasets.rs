use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use super::{ApiClient, ApiError, Endpoint, MultipartForm, RequestOptions, content_type_for};

/// A dataset owned by the signed-in user.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Dataset {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uploaded_at: String,
    /// `None` until the backend has profiled the file.
    #[serde(default)]
    pub rows: Option<u64>,
    #[serde(default)]
    pub columns: Option<u64>,
    #[serde(default)]
    pub has_missing: Option<bool>,
    #[serde(default)]
    pub metadata: Option<DatasetMetadata>,
}

/// Shown for counts the backend has not reported.
pub const NOT_AVAILABLE: &str = "N/A";

impl Dataset {
    /// Column names the wizard can offer as targets.
    pub fn feature_names(&self) -> &[String] {
        self.metadata
            .as_ref()
            .map(|metadata| metadata.feature_names.as_slice())
            .unwrap_or_default()
    }

    pub fn uploaded_at_time(&self) -> Option<OffsetDateTime> {
        parse_timestamp(&self.uploaded_at)
    }

    pub fn rows_label(&self) -> String {
        count_label(self.rows)
    }

    pub fn columns_label(&self) -> String {
        count_label(self.columns)
    }

    /// `N rows x M columns`, with `N/A` for unknown counts.
    pub fn shape_label(&self) -> String {
        format!("{} rows x {} columns", self.rows_label(), self.columns_label())
    }
}

fn count_label(count: Option<u64>) -> String {
    count.map_or_else(|| NOT_AVAILABLE.to_string(), |count| count.to_string())
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub feature_names: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub numeric_features: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categorical_features: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub warnings: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub dataset_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: String,
}

impl ApiClient {
    /// `GET /datasets/`
    pub fn list_datasets(&self) -> Result<Vec<Dataset>, ApiError> {
        self.call(
            &Endpoint::new(["datasets"]).with_trailing_slash(),
            RequestOptions::get(),
        )
    }

    /// `POST /datasets/upload` with the file as the `file` form field.
    pub fn upload_dataset(&self, path: &Path) -> Result<UploadResponse, ApiError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ApiError::Io(format!("{} is not a file", path.display())))?;
        if !file_name.to_ascii_lowercase().ends_with(".csv") {
            return Err(ApiError::Io("Only CSV files can be uploaded".into()));
        }
        let data = std::fs::read(path)
            .map_err(|err| ApiError::Io(format!("Failed to read {}: {err}", path.display())))?;
        let form = MultipartForm::single_file("file", file_name, content_type_for(file_name), &data);
        tracing::info!(file = file_name, bytes = data.len(), "Uploading dataset");
        self.call(
            &Endpoint::new(["datasets", "upload"]),
            RequestOptions::post().multipart(form),
        )
    }

    /// `DELETE /datasets/{id}`
    pub fn delete_dataset(&self, dataset_id: &str) -> Result<DeleteResponse, ApiError> {
        self.call(
            &Endpoint::new(["datasets", dataset_id]),
            RequestOptions::delete(),
        )
    }
}

fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed);
    }
    // Offset-less timestamps are stored as UTC.
    let fractional = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    let whole = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    time::PrimitiveDateTime::parse(value, fractional)
        .or_else(|_| time::PrimitiveDateTime::parse(value, whole))
        .ok()
        .map(time::PrimitiveDateTime::assume_utc)
}

/// Upload date as shown in the dataset list, e.g. `Mar 5, 2025`.
pub fn format_upload_date(value: &str) -> String {
    let display = format_description!("[month repr:short] [day padding:none], [year]");
    parse_timestamp(value)
        .and_then(|timestamp| timestamp.format(display).ok())
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client;
    use crate::http_client::test_server::{json_response, serve_once};

    const LIST_BODY: &str = r#"[
        {"id":"d1","user_id":"u","name":"housing.csv","file_url":"s3://x","uploaded_at":"2025-03-05T10:20:30.123456+00:00",
         "rows":506,"columns":3,"has_missing":false,
         "metadata":{"feature_names":["sqft","beds","price"],"numeric_features":["sqft","beds","price"],"categorical_features":[]}},
        {"id":"d2","name":"raw.csv","uploaded_at":"2025-01-01T00:00:00","rows":10,"columns":2,"has_missing":true}
    ]"#;

    #[test]
    fn list_datasets_hits_collection_route() {
        let server = serve_once(json_response(200, "OK", LIST_BODY));
        let datasets = client(&server.base_url, Some("tok")).list_datasets().unwrap();
        assert!(server.request().starts_with("GET /datasets/ HTTP/1.1"));
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0].feature_names(), ["sqft", "beds", "price"]);
        assert!(datasets[1].feature_names().is_empty());
        assert_eq!(datasets[1].has_missing, Some(true));
        assert_eq!(datasets[0].shape_label(), "506 rows x 3 columns");
    }

    #[test]
    fn unprofiled_rows_do_not_sink_the_listing() {
        let body = r#"[
            {"id":"d1","name":"pending.csv","uploaded_at":"2025-03-05T10:20:30Z",
             "rows":null,"columns":null,"has_missing":null,"metadata":null},
            {"id":"d2","name":"partial.csv","uploaded_at":null,"rows":12,"columns":null,
             "metadata":{"feature_names":null,"numeric_features":["a"],"categorical_features":null,"warnings":null}}
        ]"#;
        let server = serve_once(json_response(200, "OK", body));
        let datasets = client(&server.base_url, Some("tok")).list_datasets().unwrap();
        assert_eq!(datasets.len(), 2);

        let pending = &datasets[0];
        assert_eq!((pending.rows, pending.columns, pending.has_missing), (None, None, None));
        assert!(pending.metadata.is_none());
        assert_eq!(pending.shape_label(), "N/A rows x N/A columns");

        let partial = &datasets[1];
        assert_eq!(partial.uploaded_at, "");
        assert_eq!(partial.rows_label(), "12");
        assert_eq!(partial.columns_label(), NOT_AVAILABLE);
        assert!(partial.feature_names().is_empty());
        assert_eq!(partial.metadata.as_ref().unwrap().numeric_features, ["a"]);
    }

    #[test]
    fn upload_posts_multipart_file_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Housing.CSV");
        std::fs::write(&path, "sqft,price\n1,2\n").unwrap();
        let server = serve_once(json_response(
            200,
            "OK",
            r#"{"message":"Dataset uploaded successfully","dataset_id":"d9"}"#,
        ));
        let response = client(&server.base_url, Some("tok"))
            .upload_dataset(&path)
            .unwrap();
        assert_eq!(response.dataset_id.as_deref(), Some("d9"));
        let request = server.request();
        assert!(request.starts_with("POST /datasets/upload HTTP/1.1"));
        assert!(request.contains("name=\"file\"; filename=\"Housing.CSV\""));
        assert!(request.contains("sqft,price\n1,2\n"));
    }

    #[test]
    fn upload_rejects_non_csv_before_sending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.xlsx");
        std::fs::write(&path, "x").unwrap();
        let api = client("http://127.0.0.1:9", None);
        let err = api.upload_dataset(&path).unwrap_err();
        assert_eq!(err.to_string(), "Only CSV files can be uploaded");
        let missing = api.upload_dataset(&dir.path().join("gone.csv")).unwrap_err();
        assert!(matches!(missing, ApiError::Io(_)));
    }

    #[test]
    fn delete_targets_dataset_id() {
        let server = serve_once(json_response(
            200,
            "OK",
            r#"{"message":"Dataset deleted successfully","dataset_id":"d1"}"#,
        ));
        let response = client(&server.base_url, Some("tok"))
            .delete_dataset("d1")
            .unwrap();
        assert_eq!(response.message, "Dataset deleted successfully");
        assert!(server.request().starts_with("DELETE /datasets/d1 HTTP/1.1"));
    }

    #[test]
    fn upload_dates_are_humanized() {
        assert_eq!(format_upload_date("2025-03-05T10:20:30.123456+00:00"), "Mar 5, 2025");
        assert_eq!(format_upload_date("2024-12-25T08:00:00"), "Dec 25, 2024");
        assert_eq!(format_upload_date("yesterday"), "yesterday");
    }
}
