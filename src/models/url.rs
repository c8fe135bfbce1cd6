use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One shortening mapping. Immutable once created; expiry is a computed view
/// over `created_at` + `validity_minutes`, never stored, so the two can not
/// drift apart.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ShortUrl {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub short_code: String,
    pub original_url: String,
    pub created_at: i64,
    pub validity_minutes: i64,
}

impl ShortUrl {
    pub fn new(original_url: String, short_code: String, validity_minutes: i64) -> Self {
        Self {
            id: None,
            short_code,
            original_url,
            created_at: chrono::Utc::now().timestamp_millis(),
            validity_minutes,
        }
    }

    /// Expiry instant in epoch milliseconds.
    pub fn expires_at(&self) -> i64 {
        self.created_at + self.validity_minutes * 60_000
    }

    /// Expired once the current instant reaches the expiry instant.
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp_millis() >= self.expires_at()
    }
}
