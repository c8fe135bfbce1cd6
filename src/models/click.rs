use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One redirect traversal. The `short_code` is a weak reference to the
/// [`ShortUrl`](crate::models::url::ShortUrl) it belongs to; neither record
/// keeps the other alive.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClickEvent {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub short_code: String,
    pub clicked_at: i64,
    pub referrer: Option<String>,
    pub ip_address: String,
    pub user_agent: Option<String>,
}

impl ClickEvent {
    pub fn new(
        short_code: String,
        referrer: Option<String>,
        ip_address: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            id: None,
            short_code,
            clicked_at: chrono::Utc::now().timestamp_millis(),
            referrer,
            ip_address,
            user_agent,
        }
    }
}
