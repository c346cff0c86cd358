use std::collections::BTreeMap;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api returned {status}: {body}")]
    Api {
        status: StatusCode,
        body: String,
        message: Option<String>,
    },
    #[error("validation failed: {}", join_field_errors(.fields))]
    Validation { fields: BTreeMap<String, String> },
}

impl ApiError {
    /// Structured message from the server, when the failure body carried one.
    /// Transport errors and unstructured bodies return `None`, letting the
    /// caller substitute its own fallback text.
    pub fn server_message(&self) -> Option<String> {
        match self {
            ApiError::Api {
                message: Some(message),
                ..
            } => Some(message.clone()),
            ApiError::Validation { fields } => Some(join_field_errors(fields)),
            _ => None,
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ApiError::Api { status, .. }
                if matches!(*status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        )
    }
}

fn join_field_errors(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Anonymous client, only good for `login`/`signup`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
            token: None,
        })
    }

    pub fn with_token(base_url: &str, token: impl Into<String>) -> Result<Self, ApiError> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
            token: Some(token.into()),
        })
    }

    pub async fn list_files(&self, query: Option<&str>) -> Result<Vec<FileRecord>, ApiError> {
        let mut url = self.endpoint("/api/files")?;
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.query_pairs_mut().append_pair("q", query);
        }
        let response = self.request(Method::GET, url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn get_stats(&self) -> Result<StorageStats, ApiError> {
        let url = self.endpoint("/api/files/stats")?;
        let response = self.request(Method::GET, url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn upload_file(
        &self,
        filename: &str,
        mime_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<FileRecord, ApiError> {
        let url = self.endpoint("/api/files")?;
        let mut part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        if let Some(mime_type) = mime_type {
            part = part.mime_str(mime_type)?;
        }
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self.request(Method::POST, url).multipart(form).send().await?;
        Self::handle_response(response).await
    }

    pub async fn rename_file(&self, id: i64, filename: &str) -> Result<FileRecord, ApiError> {
        let url = self.endpoint(&format!("/api/files/{id}"))?;
        let response = self
            .request(Method::PUT, url)
            .json(&RenameRequest { filename })
            .send()
            .await?;
        Self::handle_response(response).await
    }

    pub async fn delete_file(&self, id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/api/files/{id}"))?;
        let response = self.request(Method::DELETE, url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::failure(response).await)
        }
    }

    /// Returns the raw response so the caller can stream the body; the
    /// payload is opaque binary and is never parsed here.
    pub async fn download_file(&self, id: i64) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint(&format!("/api/files/{id}/download"))?;
        let response = self.request(Method::GET, url).send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::failure(response).await)
        }
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut request = self.http.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    pub(crate) async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(Self::failure(response).await)
        }
    }

    async fn failure(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if let Ok(failure) = serde_json::from_str::<FailureBody>(&body) {
            if let Some(fields) = failure.field_errors.filter(|f| !f.is_empty()) {
                return ApiError::Validation { fields };
            }
            if failure.message.is_some() {
                return ApiError::Api {
                    status,
                    body,
                    message: failure.message,
                };
            }
        }
        ApiError::Api {
            status,
            body,
            message: None,
        }
    }
}

#[derive(Serialize)]
struct RenameRequest<'a> {
    filename: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FailureBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    field_errors: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: i64,
    pub filename: String,
    pub file_size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub file_count: u64,
    pub storage_used: u64,
}
