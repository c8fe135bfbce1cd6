use std::sync::Arc;

use serde_json::Value;

use crate::db::{Datastore, StoreError};
use crate::errors::ServiceError;
use crate::models::click::ClickEvent;
use crate::models::url::ShortUrl;
use crate::services::uniqueness::{
    MAX_GENERATION_ATTEMPTS, reserve_custom_code, resolve_unique_code,
};
use crate::services::validation::{validate_url, validate_validity_period};
use crate::utils::log_sink::EventLog;

const COMPONENT: &str = "lifecycle";

/// A successfully created mapping plus its external-facing short link.
#[derive(Debug, Clone)]
pub struct CreatedUrl {
    pub record: ShortUrl,
    pub short_link: String,
}

/// Per-code statistics: the mapping plus its full, newest-first click list.
#[derive(Debug, Clone)]
pub struct UrlStats {
    pub record: ShortUrl,
    pub total_clicks: u64,
    pub clicks: Vec<ClickEvent>,
}

/// Orchestrates validation, code resolution, expiry computation, and click
/// recording over an injected datastore.
#[derive(Clone)]
pub struct ShortcodeService {
    store: Arc<dyn Datastore>,
    events: EventLog,
    base_url: String,
}

impl ShortcodeService {
    pub fn new(store: Arc<dyn Datastore>, events: EventLog, base_url: String) -> Self {
        Self {
            store,
            events,
            base_url,
        }
    }

    fn short_link(&self, code: &str) -> String {
        format!("{}/r/{}", self.base_url.trim_end_matches('/'), code)
    }

    /// Create a new mapping. All validation happens before any persistence
    /// attempt. A duplicate-key violation at insert time maps to
    /// `DuplicateCode` for custom codes; for generated codes the insert is
    /// retried once with a fresh candidate before giving up.
    pub async fn create(
        &self,
        url: Option<&str>,
        validity: Option<&Value>,
        custom_code: Option<&str>,
    ) -> Result<CreatedUrl, ServiceError> {
        let url = match url.map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => {
                self.events.warn(COMPONENT, "create rejected: missing url");
                return Err(ServiceError::MissingUrl);
            }
        };

        if !validate_url(url) {
            self.events
                .warn(COMPONENT, &format!("create rejected: invalid url {url:?}"));
            return Err(ServiceError::InvalidUrlFormat);
        }

        let validity_minutes = match validate_validity_period(validity) {
            Ok(minutes) => minutes,
            Err(err) => {
                self.events
                    .warn(COMPONENT, &format!("create rejected: {err}"));
                return Err(err);
            }
        };

        let custom = custom_code.map(str::trim).filter(|code| !code.is_empty());
        let code = match custom {
            Some(code) => {
                if let Err(err) = reserve_custom_code(self.store.as_ref(), code).await {
                    self.events
                        .warn(COMPONENT, &format!("custom code {code:?} rejected: {err}"));
                    return Err(err);
                }
                code.to_string()
            }
            None => resolve_unique_code(self.store.as_ref(), MAX_GENERATION_ATTEMPTS).await?,
        };

        let mut record = ShortUrl::new(url.to_string(), code, validity_minutes);
        if let Err(err) = self.store.insert_url(&record).await {
            match err {
                StoreError::DuplicateCode if custom.is_some() => {
                    // Lost the check-then-insert race to a concurrent creator.
                    self.events.warn(
                        COMPONENT,
                        &format!("custom code {} taken at insert time", record.short_code),
                    );
                    return Err(ServiceError::DuplicateCode);
                }
                StoreError::DuplicateCode => {
                    // Generated candidate collided at the last instant; one
                    // fresh attempt, then surface the fault.
                    let code =
                        resolve_unique_code(self.store.as_ref(), MAX_GENERATION_ATTEMPTS).await?;
                    record = ShortUrl::new(url.to_string(), code, validity_minutes);
                    if let Err(err) = self.store.insert_url(&record).await {
                        self.events.error(
                            COMPONENT,
                            &format!("insert failed after generation retry: {err}"),
                            None,
                        );
                        return Err(ServiceError::Persistence(err.to_string()));
                    }
                }
                StoreError::Backend(message) => {
                    self.events
                        .error(COMPONENT, &format!("insert failed: {message}"), None);
                    return Err(ServiceError::Persistence(message));
                }
            }
        }

        self.events.info(
            COMPONENT,
            &format!("created {} -> {}", record.short_code, record.original_url),
        );
        Ok(CreatedUrl {
            short_link: self.short_link(&record.short_code),
            record,
        })
    }

    /// Fetch a mapping for redirecting. Expired mappings stay in the
    /// datastore for analytics but no longer authorize a redirect.
    pub async fn fetch_for_redirect(&self, code: &str) -> Result<ShortUrl, ServiceError> {
        let record = self
            .store
            .find_url(code)
            .await
            .map_err(ServiceError::from)?
            .ok_or(ServiceError::NotFound)?;

        if record.is_expired() {
            let expired_at = record.expires_at();
            self.events
                .warn(COMPONENT, &format!("redirect rejected, {code} expired"));
            return Err(ServiceError::Expired { expired_at });
        }

        self.events
            .info(COMPONENT, &format!("redirect {code} -> {}", record.original_url));
        Ok(record)
    }

    /// Record one click. Best-effort: a failed insert is logged and dropped,
    /// never surfaced to the redirect path.
    pub async fn record_click(
        &self,
        code: &str,
        referrer: Option<String>,
        ip_address: String,
        user_agent: Option<String>,
    ) {
        let click = ClickEvent::new(code.to_string(), referrer, ip_address, user_agent);
        if let Err(err) = self.store.insert_click(&click).await {
            self.events.error(
                COMPONENT,
                &format!("failed to record click for {code}: {err}"),
                None,
            );
        }
    }

    /// Detailed per-code statistics, clicks newest-first.
    pub async fn fetch_statistics(&self, code: &str) -> Result<UrlStats, ServiceError> {
        let record = self
            .store
            .find_url(code)
            .await
            .map_err(ServiceError::from)?
            .ok_or(ServiceError::NotFound)?;

        let clicks = self
            .store
            .clicks_for(code)
            .await
            .map_err(ServiceError::from)?;

        Ok(UrlStats {
            total_clicks: clicks.len() as u64,
            record,
            clicks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::utils::log_sink::{LogSink, StdLogSink};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn service() -> (ShortcodeService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = ShortcodeService::new(
            store.clone(),
            EventLog::new(Arc::new(StdLogSink)),
            "http://localhost:8080".into(),
        );
        (service, store)
    }

    #[tokio::test]
    async fn create_without_custom_code_generates_six_chars() {
        let (service, _) = service();
        let created = service
            .create(Some("https://example.com"), Some(&json!(60)), None)
            .await
            .unwrap();
        assert_eq!(created.record.short_code.len(), 6);
        assert!(
            created
                .record
                .short_code
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        );
        assert_eq!(
            created.short_link,
            format!("http://localhost:8080/r/{}", created.record.short_code)
        );
    }

    #[tokio::test]
    async fn generated_codes_stay_unique_across_creates() {
        let (service, _) = service();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let created = service
                .create(Some("https://example.com"), None, None)
                .await
                .unwrap();
            assert!(seen.insert(created.record.short_code));
        }
    }

    #[tokio::test]
    async fn expiry_equals_creation_plus_validity_exactly() {
        let (service, _) = service();
        let created = service
            .create(Some("https://example.com"), Some(&json!(60)), None)
            .await
            .unwrap();
        assert_eq!(created.record.validity_minutes, 60);
        assert_eq!(
            created.record.expires_at(),
            created.record.created_at + 60 * 60_000
        );
    }

    #[tokio::test]
    async fn round_trip_returns_the_original_url() {
        let (service, _) = service();
        let created = service
            .create(Some("https://example.com/page"), Some(&json!(60)), None)
            .await
            .unwrap();
        let fetched = service
            .fetch_for_redirect(&created.record.short_code)
            .await
            .unwrap();
        assert_eq!(fetched.original_url, "https://example.com/page");
    }

    #[tokio::test]
    async fn missing_and_invalid_urls_are_rejected_before_persistence() {
        let (service, store) = service();
        assert_eq!(
            service.create(None, None, None).await.unwrap_err(),
            ServiceError::MissingUrl
        );
        assert_eq!(
            service.create(Some("  "), None, None).await.unwrap_err(),
            ServiceError::MissingUrl
        );
        assert_eq!(
            service.create(Some("not-a-url"), None, None).await.unwrap_err(),
            ServiceError::InvalidUrlFormat
        );
        assert!(store.list_urls().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn validity_bounds_propagate_their_sub_kind() {
        let (service, _) = service();
        assert_eq!(
            service
                .create(Some("https://example.com"), Some(&json!(0)), None)
                .await
                .unwrap_err(),
            ServiceError::ValidityTooShort
        );
        assert_eq!(
            service
                .create(Some("https://example.com"), Some(&json!(10_081)), None)
                .await
                .unwrap_err(),
            ServiceError::ValidityTooLong
        );
        assert_eq!(
            service
                .create(Some("https://example.com"), Some(&json!("later")), None)
                .await
                .unwrap_err(),
            ServiceError::ValidityNotANumber
        );
        // Boundary values are accepted.
        for minutes in [1, 10_080] {
            service
                .create(Some("https://example.com"), Some(&json!(minutes)), None)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn custom_code_is_honored_once_then_conflicts() {
        let (service, _) = service();
        let created = service
            .create(Some("https://example.com"), None, Some("launch24"))
            .await
            .unwrap();
        assert_eq!(created.record.short_code, "launch24");

        assert_eq!(
            service
                .create(Some("https://other.example"), None, Some("launch24"))
                .await
                .unwrap_err(),
            ServiceError::DuplicateCode
        );
    }

    #[tokio::test]
    async fn two_char_custom_code_is_malformed() {
        let (service, _) = service();
        assert_eq!(
            service
                .create(Some("https://example.com"), None, Some("ab"))
                .await
                .unwrap_err(),
            ServiceError::InvalidCodeFormat
        );
    }

    #[tokio::test]
    async fn expired_record_reports_its_computed_expiry() {
        let (service, store) = service();
        let mut record = ShortUrl::new("https://example.com".into(), "gone42".into(), 1);
        record.created_at -= 2 * 60_000; // created two minutes ago, one minute validity
        let expected_expiry = record.expires_at();
        store.insert_url(&record).await.unwrap();

        assert_eq!(
            service.fetch_for_redirect("gone42").await.unwrap_err(),
            ServiceError::Expired {
                expired_at: expected_expiry
            }
        );
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let (service, _) = service();
        assert_eq!(
            service.fetch_for_redirect("nope99").await.unwrap_err(),
            ServiceError::NotFound
        );
        assert_eq!(
            service.fetch_statistics("nope99").await.unwrap_err(),
            ServiceError::NotFound
        );
    }

    #[tokio::test]
    async fn three_clicks_from_distinct_ips_show_up_newest_first() {
        let (service, store) = service();
        let created = service
            .create(Some("https://example.com"), Some(&json!(60)), None)
            .await
            .unwrap();
        let code = created.record.short_code.clone();

        for (offset, ip) in [(1, "203.0.113.1"), (2, "203.0.113.2"), (3, "203.0.113.3")] {
            let mut click = ClickEvent::new(code.clone(), None, ip.to_string(), None);
            click.clicked_at = created.record.created_at + offset;
            store.insert_click(&click).await.unwrap();
        }

        let stats = service.fetch_statistics(&code).await.unwrap();
        assert_eq!(stats.total_clicks, 3);
        let ips: Vec<&str> = stats.clicks.iter().map(|c| c.ip_address.as_str()).collect();
        assert_eq!(ips, vec!["203.0.113.3", "203.0.113.2", "203.0.113.1"]);
    }

    #[tokio::test]
    async fn statistics_reads_are_idempotent() {
        let (service, _) = service();
        let created = service
            .create(Some("https://example.com"), Some(&json!(60)), None)
            .await
            .unwrap();
        let code = created.record.short_code.clone();
        service
            .record_click(&code, None, "203.0.113.9".into(), None)
            .await;

        let first = service.fetch_statistics(&code).await.unwrap();
        let second = service.fetch_statistics(&code).await.unwrap();
        assert_eq!(first.total_clicks, second.total_clicks);
        assert_eq!(
            first.clicks.iter().map(|c| c.clicked_at).collect::<Vec<_>>(),
            second.clicks.iter().map(|c| c.clicked_at).collect::<Vec<_>>()
        );
    }

    /// Pre-check sees no conflict but the first insert reports a duplicate,
    /// simulating a lost check-then-insert race.
    struct RacyStore {
        inner: MemoryStore,
        failures_left: AtomicU32,
    }

    impl RacyStore {
        fn failing(times: u32) -> Self {
            Self {
                inner: MemoryStore::new(),
                failures_left: AtomicU32::new(times),
            }
        }
    }

    #[async_trait]
    impl Datastore for RacyStore {
        async fn insert_url(&self, url: &ShortUrl) -> Result<(), StoreError> {
            if self.failures_left.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                n.checked_sub(1)
            })
            .is_ok()
            {
                return Err(StoreError::DuplicateCode);
            }
            self.inner.insert_url(url).await
        }
        async fn find_url(&self, code: &str) -> Result<Option<ShortUrl>, StoreError> {
            self.inner.find_url(code).await
        }
        async fn insert_click(&self, click: &ClickEvent) -> Result<(), StoreError> {
            self.inner.insert_click(click).await
        }
        async fn clicks_for(&self, code: &str) -> Result<Vec<ClickEvent>, StoreError> {
            self.inner.clicks_for(code).await
        }
        async fn count_clicks(&self, code: &str) -> Result<u64, StoreError> {
            self.inner.count_clicks(code).await
        }
        async fn list_urls(&self) -> Result<Vec<ShortUrl>, StoreError> {
            self.inner.list_urls().await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            self.inner.ping().await
        }
    }

    fn racy_service(failures: u32) -> ShortcodeService {
        ShortcodeService::new(
            Arc::new(RacyStore::failing(failures)),
            EventLog::new(Arc::new(StdLogSink)),
            "http://localhost:8080".into(),
        )
    }

    #[tokio::test]
    async fn custom_code_losing_the_insert_race_is_a_duplicate() {
        let service = racy_service(1);
        assert_eq!(
            service
                .create(Some("https://example.com"), None, Some("contested"))
                .await
                .unwrap_err(),
            ServiceError::DuplicateCode
        );
    }

    #[tokio::test]
    async fn generated_code_race_retries_once_then_succeeds() {
        let service = racy_service(1);
        let created = service
            .create(Some("https://example.com"), None, None)
            .await
            .unwrap();
        assert_eq!(created.record.short_code.len(), 6);
    }

    #[tokio::test]
    async fn generated_code_race_gives_up_after_the_single_retry() {
        let service = racy_service(2);
        assert!(matches!(
            service
                .create(Some("https://example.com"), None, None)
                .await
                .unwrap_err(),
            ServiceError::Persistence(_)
        ));
    }

    /// A sink that always fails; core operations must not notice.
    struct DeadSink;

    impl LogSink for DeadSink {
        fn emit(
            &self,
            _: log::Level,
            _: &str,
            _: &str,
            _: Option<&str>,
        ) -> anyhow::Result<()> {
            anyhow::bail!("sink offline")
        }
    }

    #[tokio::test]
    async fn failing_log_sink_never_fails_a_core_operation() {
        let store = Arc::new(MemoryStore::new());
        let service = ShortcodeService::new(
            store,
            EventLog::new(Arc::new(DeadSink)),
            "http://localhost:8080".into(),
        );
        let created = service
            .create(Some("https://example.com"), Some(&json!(60)), None)
            .await
            .unwrap();
        service
            .record_click(&created.record.short_code, None, "203.0.113.1".into(), None)
            .await;
        let stats = service
            .fetch_statistics(&created.record.short_code)
            .await
            .unwrap();
        assert_eq!(stats.total_clicks, 1);
    }
}
