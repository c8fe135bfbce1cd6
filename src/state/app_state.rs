use std::sync::Arc;

use crate::db::Datastore;
use crate::services::analytics::AnalyticsReader;
use crate::services::lifecycle::ShortcodeService;
use crate::utils::log_sink::EventLog;

/// Shared per-worker state. Everything is constructed once in `main` and
/// injected; handlers never touch a global datastore handle.
pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub shortener: ShortcodeService,
    pub analytics: AnalyticsReader,
}

impl AppState {
    pub fn new(store: Arc<dyn Datastore>, events: EventLog, base_url: String) -> Self {
        Self {
            shortener: ShortcodeService::new(store.clone(), events, base_url.clone()),
            analytics: AnalyticsReader::new(store.clone(), base_url),
            store,
        }
    }
}
