pub mod memory;
pub mod mongodb;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::click::ClickEvent;
use crate::models::url::ShortUrl;

/// Failures surfaced by a datastore backend. The backend is the source of
/// truth for shortcode uniqueness: an insert racing another creator must come
/// back as `DuplicateCode`, never as an opaque fault.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("shortcode already exists")]
    DuplicateCode,
    #[error("datastore backend error: {0}")]
    Backend(String),
}

/// The small persistence surface the lifecycle engine needs. Handles are
/// constructed in `main` and passed in explicitly; nothing reaches for a
/// global connection.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Insert-if-absent keyed on `short_code`.
    async fn insert_url(&self, url: &ShortUrl) -> Result<(), StoreError>;

    /// Point lookup by shortcode.
    async fn find_url(&self, code: &str) -> Result<Option<ShortUrl>, StoreError>;

    async fn insert_click(&self, click: &ClickEvent) -> Result<(), StoreError>;

    /// Click events for one shortcode, ordered by `clicked_at` descending.
    async fn clicks_for(&self, code: &str) -> Result<Vec<ClickEvent>, StoreError>;

    async fn count_clicks(&self, code: &str) -> Result<u64, StoreError>;

    /// All mappings, ordered by `created_at` descending.
    async fn list_urls(&self) -> Result<Vec<ShortUrl>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
