use parking_lot::Mutex;
use patrakosh_core::{ApiClient, ApiError};

use crate::cache::{CollectionView, OperationState};

/// Orchestrates remote calls and commits their results into the collection
/// view. Every mutation re-fetches the authoritative list and stats instead
/// of patching locally, so the view is always a pure function of the last
/// completed refresh.
///
/// Locks are only held between suspension points, never across an await.
/// Overlapping operations of different kinds are allowed; overlapping
/// refreshes both apply, last to complete wins. No request is cancelled.
pub struct SyncController {
    api: ApiClient,
    view: Mutex<CollectionView>,
    ops: Mutex<OperationState>,
}

const LOAD_FAILED: &str = "Failed to load files";
const UPLOAD_FAILED: &str = "Upload failed";
const DELETE_FAILED: &str = "Delete failed";
const RENAME_FAILED: &str = "Rename failed";

impl SyncController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            view: Mutex::new(CollectionView::default()),
            ops: Mutex::new(OperationState::default()),
        }
    }

    /// Initial population of the view, equivalent to an unfiltered refresh.
    pub async fn load(&self) {
        self.refresh(Some("")).await;
    }

    /// Re-fetches the list and stats and commits both atomically. `Some`
    /// replaces the stored search query (trimmed) first; `None` keeps it,
    /// which is how mutations preserve the active filter.
    pub async fn refresh(&self, query: Option<&str>) {
        {
            let mut ops = self.ops.lock();
            ops.error_message.clear();
            ops.loading = true;
        }
        if let Some(query) = query {
            self.view.lock().query = query.trim().to_string();
        }
        let query = self.view.lock().query.clone();
        let filter = (!query.is_empty()).then_some(query.as_str());

        // Independent reads with no ordering dependency, issued together.
        let result = tokio::try_join!(self.api.list_files(filter), self.api.get_stats());
        match result {
            Ok((items, stats)) => self.view.lock().replace(items, stats),
            Err(err) => self.record_error(LOAD_FAILED, err),
        }
        self.ops.lock().loading = false;
    }

    pub async fn upload(&self, filename: &str, mime_type: Option<&str>, bytes: Vec<u8>) {
        {
            let mut ops = self.ops.lock();
            ops.error_message.clear();
            ops.uploading = true;
        }
        match self.api.upload_file(filename, mime_type, bytes).await {
            Ok(_) => self.refresh(None).await,
            Err(err) => self.record_error(UPLOAD_FAILED, err),
        }
        self.ops.lock().uploading = false;
    }

    pub async fn delete(&self, id: i64) {
        self.ops.lock().error_message.clear();
        match self.api.delete_file(id).await {
            Ok(()) => self.refresh(None).await,
            Err(err) => self.record_error(DELETE_FAILED, err),
        }
    }

    /// An empty name after trimming, or one equal to the record's current
    /// filename, is a silent no-op with zero remote calls.
    pub async fn rename(&self, id: i64, new_name: &str) {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return;
        }
        let current = self.view.lock().find(id).map(|file| file.filename.clone());
        if current.as_deref() == Some(new_name) {
            return;
        }
        self.ops.lock().error_message.clear();
        match self.api.rename_file(id, new_name).await {
            Ok(_) => self.refresh(None).await,
            Err(err) => self.record_error(RENAME_FAILED, err),
        }
    }

    pub fn view(&self) -> CollectionView {
        self.view.lock().clone()
    }

    pub fn operation_state(&self) -> OperationState {
        self.ops.lock().clone()
    }

    fn record_error(&self, fallback: &str, err: ApiError) {
        let message = err
            .server_message()
            .unwrap_or_else(|| fallback.to_string());
        self.ops.lock().error_message = message;
    }
}
