mod auth;
mod client;

pub use auth::{AuthSession, UserProfile};
pub use client::{ApiClient, ApiError, FileRecord, StorageStats};
