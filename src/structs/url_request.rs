use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::click::ClickEvent;
use crate::services::analytics::UrlSummary;
use crate::services::lifecycle::{CreatedUrl, UrlStats};
use crate::utils::time::iso_millis;

/// Create-request body. `validity` stays raw JSON so the validator can
/// distinguish "not a number" from out-of-range.
#[derive(Deserialize, Serialize)]
pub struct ShortenRequest {
    pub url: Option<String>,
    pub validity: Option<Value>,
    pub shortcode: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub short_link: String,
    pub expiry: String,
    pub shortcode: String,
    pub original_url: String,
    pub validity_minutes: i64,
}

impl ShortenResponse {
    pub fn from_created(created: &CreatedUrl) -> Self {
        Self {
            short_link: created.short_link.clone(),
            expiry: iso_millis(created.record.expires_at()),
            shortcode: created.record.short_code.clone(),
            original_url: created.record.original_url.clone(),
            validity_minutes: created.record.validity_minutes,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickDetail {
    pub clicked_at: String,
    pub referrer: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
}

impl ClickDetail {
    fn from_event(event: &ClickEvent) -> Self {
        Self {
            clicked_at: iso_millis(event.clicked_at),
            referrer: event.referrer.clone().unwrap_or_else(|| "Direct".into()),
            ip_address: event.ip_address.clone(),
            user_agent: event.user_agent.clone(),
        }
    }
}

/// Detailed per-code statistics response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub shortcode: String,
    pub original_url: String,
    pub created_at: String,
    pub expires_at: String,
    pub validity_minutes: i64,
    pub is_expired: bool,
    pub total_clicks: u64,
    pub click_details: Vec<ClickDetail>,
}

impl StatsView {
    pub fn from_stats(stats: &UrlStats) -> Self {
        Self {
            shortcode: stats.record.short_code.clone(),
            original_url: stats.record.original_url.clone(),
            created_at: iso_millis(stats.record.created_at),
            expires_at: iso_millis(stats.record.expires_at()),
            validity_minutes: stats.record.validity_minutes,
            is_expired: stats.record.is_expired(),
            total_clicks: stats.total_clicks,
            click_details: stats.clicks.iter().map(ClickDetail::from_event).collect(),
        }
    }
}

/// Aggregate-only entry in the all-codes listing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub shortcode: String,
    pub short_link: String,
    pub original_url: String,
    pub created_at: String,
    pub expires_at: String,
    pub is_expired: bool,
    pub total_clicks: u64,
}

impl StatsSummary {
    pub fn from_summary(summary: &UrlSummary) -> Self {
        Self {
            shortcode: summary.record.short_code.clone(),
            short_link: summary.short_link.clone(),
            original_url: summary.record.original_url.clone(),
            created_at: iso_millis(summary.record.created_at),
            expires_at: iso_millis(summary.record.expires_at()),
            is_expired: summary.record.is_expired(),
            total_clicks: summary.total_clicks,
        }
    }
}
