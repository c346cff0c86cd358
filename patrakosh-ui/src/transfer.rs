use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use patrakosh_core::{ApiClient, ApiError};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("api error: {0}")]
    Api(#[from] ApiError),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

const FALLBACK_FILENAME: &str = "download";

/// Streams a file's raw bytes to a local path. Side-effecting only: the
/// payload is never parsed or cached, and the collection view is untouched.
/// Single attempt, no retry.
pub struct TransferHelper {
    api: ApiClient,
    target_dir: PathBuf,
}

impl TransferHelper {
    pub fn new(api: ApiClient, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            target_dir: target_dir.into(),
        }
    }

    /// Saves file `id` under `suggested_filename` in the target directory,
    /// falling back to a generic name when the suggestion is empty. The body
    /// lands in a `.partial` file first and is renamed once complete.
    pub async fn download(
        &self,
        id: i64,
        suggested_filename: &str,
    ) -> Result<PathBuf, TransferError> {
        let response = self.api.download_file(id).await?;

        tokio::fs::create_dir_all(&self.target_dir).await?;
        let target = self.target_dir.join(save_name(suggested_filename));
        let partial = partial_path(&target);
        let mut file = tokio::fs::File::create(&partial).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }

        file.flush().await?;
        file.sync_all().await?;
        tokio::fs::rename(&partial, &target).await?;
        Ok(target)
    }
}

// Keep only the final path component so a hostile suggestion cannot escape
// the target directory.
fn save_name(suggested: &str) -> String {
    Path::new(suggested.trim())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

fn partial_path(target: &Path) -> PathBuf {
    target.with_extension(format!(
        "{}partial",
        target
            .extension()
            .map(|ext| format!("{}.", ext.to_string_lossy()))
            .unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn helper(server: &MockServer, dir: &Path) -> TransferHelper {
        let api = ApiClient::with_token(&server.uri(), "test-token").unwrap();
        TransferHelper::new(api, dir)
    }

    #[tokio::test]
    async fn downloads_file_under_suggested_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/files/5/download"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello"))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let saved = helper(&server, dir.path())
            .download(5, "a.txt")
            .await
            .unwrap();

        assert_eq!(saved, dir.path().join("a.txt"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"hello");
        assert!(!dir.path().join("a.txt.partial").exists());
    }

    #[tokio::test]
    async fn empty_suggestion_falls_back_to_generic_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/files/5/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data"))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let saved = helper(&server, dir.path()).download(5, "  ").await.unwrap();

        assert_eq!(saved, dir.path().join("download"));
    }

    #[tokio::test]
    async fn suggestion_with_path_components_is_reduced_to_basename() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/files/5/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data"))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let saved = helper(&server, dir.path())
            .download(5, "../../etc/evil.txt")
            .await
            .unwrap();

        assert_eq!(saved, dir.path().join("evil.txt"));
    }

    #[tokio::test]
    async fn server_failure_is_reported_and_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/files/5/download"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let err = helper(&server, dir.path())
            .download(5, "a.txt")
            .await
            .expect_err("expected download failure");

        assert!(matches!(err, TransferError::Api(_)));
        assert!(!dir.path().join("a.txt").exists());
    }
}
