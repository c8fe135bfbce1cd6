use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::db::{Datastore, StoreError};
use crate::models::click::ClickEvent;
use crate::models::url::ShortUrl;

/// In-memory datastore. Used for isolated test instances and for running the
/// service without MongoDB (`DATASTORE=memory`). The entry API gives the same
/// insert-if-absent semantics as the Mongo unique index.
#[derive(Default)]
pub struct MemoryStore {
    urls: DashMap<String, ShortUrl>,
    clicks: DashMap<String, Vec<ClickEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn insert_url(&self, url: &ShortUrl) -> Result<(), StoreError> {
        match self.urls.entry(url.short_code.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateCode),
            Entry::Vacant(vacant) => {
                vacant.insert(url.clone());
                Ok(())
            }
        }
    }

    async fn find_url(&self, code: &str) -> Result<Option<ShortUrl>, StoreError> {
        Ok(self.urls.get(code).map(|entry| entry.clone()))
    }

    async fn insert_click(&self, click: &ClickEvent) -> Result<(), StoreError> {
        self.clicks
            .entry(click.short_code.clone())
            .or_default()
            .push(click.clone());
        Ok(())
    }

    async fn clicks_for(&self, code: &str) -> Result<Vec<ClickEvent>, StoreError> {
        let mut clicks = self
            .clicks
            .get(code)
            .map(|entry| entry.clone())
            .unwrap_or_default();
        clicks.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at));
        Ok(clicks)
    }

    async fn count_clicks(&self, code: &str) -> Result<u64, StoreError> {
        Ok(self
            .clicks
            .get(code)
            .map(|entry| entry.len() as u64)
            .unwrap_or(0))
    }

    async fn list_urls(&self) -> Result<Vec<ShortUrl>, StoreError> {
        let mut urls: Vec<ShortUrl> = self.urls.iter().map(|entry| entry.value().clone()).collect();
        urls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(urls)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
