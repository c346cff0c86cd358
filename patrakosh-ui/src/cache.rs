use patrakosh_core::{FileRecord, StorageStats};

/// Local projection of the server-side collection at last sync time.
/// Replaced wholesale after every successful fetch, never patched in place,
/// so it can go stale between syncs but never diverge structurally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionView {
    pub items: Vec<FileRecord>,
    pub query: String,
    pub stats: StorageStats,
}

impl CollectionView {
    /// Items and stats commit together. The list may be a filtered subset
    /// while stats are collection-wide, so swapping one without the other
    /// would expose a mismatched aggregate.
    pub fn replace(&mut self, items: Vec<FileRecord>, stats: StorageStats) {
        self.items = items;
        self.stats = stats;
    }

    pub fn find(&self, id: i64) -> Option<&FileRecord> {
        self.items.iter().find(|file| file.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationState {
    pub loading: bool,
    pub uploading: bool,
    pub error_message: String,
}

impl OperationState {
    pub fn has_error(&self) -> bool {
        !self.error_message.is_empty()
    }
}
