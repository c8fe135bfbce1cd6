use std::sync::Arc;

use crate::db::Datastore;
use crate::errors::ServiceError;
use crate::models::url::ShortUrl;

/// Lightweight per-code entry for the all-codes listing: aggregate click
/// count only, no click detail.
#[derive(Debug, Clone)]
pub struct UrlSummary {
    pub record: ShortUrl,
    pub total_clicks: u64,
    pub short_link: String,
}

/// Read side of the analytics surface. A full snapshot is recomputed on
/// every call; nothing is cached.
#[derive(Clone)]
pub struct AnalyticsReader {
    store: Arc<dyn Datastore>,
    base_url: String,
}

impl AnalyticsReader {
    pub fn new(store: Arc<dyn Datastore>, base_url: String) -> Self {
        Self { store, base_url }
    }

    /// One summary per mapping, newest creation first.
    pub async fn list_all(&self) -> Result<Vec<UrlSummary>, ServiceError> {
        let urls = self.store.list_urls().await.map_err(ServiceError::from)?;

        let mut summaries = Vec::with_capacity(urls.len());
        for record in urls {
            let total_clicks = self
                .store
                .count_clicks(&record.short_code)
                .await
                .unwrap_or(0);
            summaries.push(UrlSummary {
                short_link: format!(
                    "{}/r/{}",
                    self.base_url.trim_end_matches('/'),
                    record.short_code
                ),
                total_clicks,
                record,
            });
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::click::ClickEvent;

    #[tokio::test]
    async fn listing_orders_by_creation_time_descending_with_counts() {
        let store = Arc::new(MemoryStore::new());
        let mut older = ShortUrl::new("https://a.example".into(), "older1".into(), 60);
        older.created_at = 1_000;
        let mut newer = ShortUrl::new("https://b.example".into(), "newer1".into(), 60);
        newer.created_at = 2_000;
        store.insert_url(&older).await.unwrap();
        store.insert_url(&newer).await.unwrap();
        for _ in 0..2 {
            store
                .insert_click(&ClickEvent::new(
                    "older1".into(),
                    None,
                    "203.0.113.1".into(),
                    None,
                ))
                .await
                .unwrap();
        }

        let reader = AnalyticsReader::new(store, "http://localhost:8080/".into());
        let summaries = reader.list_all().await.unwrap();

        let codes: Vec<&str> = summaries
            .iter()
            .map(|s| s.record.short_code.as_str())
            .collect();
        assert_eq!(codes, vec!["newer1", "older1"]);
        assert_eq!(summaries[0].total_clicks, 0);
        assert_eq!(summaries[1].total_clicks, 2);
        assert_eq!(summaries[0].short_link, "http://localhost:8080/r/newer1");
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let reader = AnalyticsReader::new(
            Arc::new(MemoryStore::new()),
            "http://localhost:8080".into(),
        );
        assert!(reader.list_all().await.unwrap().is_empty());
    }
}
