use actix_web::{HttpResponse, http::StatusCode};
use thiserror::Error;

use crate::db::StoreError;
use crate::utils::time::iso_millis;

/// Domain errors for the shortcode lifecycle. Validation failures are
/// detected before any persistence attempt and returned directly; server-side
/// faults are surfaced with a generic message only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("url is required")]
    MissingUrl,
    #[error("url must be an absolute http or https address")]
    InvalidUrlFormat,
    #[error("validity must be a whole number of minutes")]
    ValidityNotANumber,
    #[error("validity must be at least 1 minute")]
    ValidityTooShort,
    #[error("validity must be at most 10080 minutes")]
    ValidityTooLong,
    #[error("shortcode must be 3-20 alphanumeric characters")]
    InvalidCodeFormat,
    #[error("shortcode already in use")]
    DuplicateCode,
    #[error("could not allocate a unique shortcode")]
    GenerationExhausted,
    #[error("shortcode not found")]
    NotFound,
    #[error("this short link has expired")]
    Expired { expired_at: i64 },
    #[error("datastore failure: {0}")]
    Persistence(String),
}

impl ServiceError {
    /// Stable machine-readable kind for error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::MissingUrl => "missing_url",
            ServiceError::InvalidUrlFormat => "invalid_url",
            ServiceError::ValidityNotANumber
            | ServiceError::ValidityTooShort
            | ServiceError::ValidityTooLong => "invalid_validity",
            ServiceError::InvalidCodeFormat => "invalid_shortcode",
            ServiceError::DuplicateCode => "duplicate_shortcode",
            ServiceError::GenerationExhausted => "generation_exhausted",
            ServiceError::NotFound => "not_found",
            ServiceError::Expired { .. } => "expired",
            ServiceError::Persistence(_) => "persistence_error",
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateCode => ServiceError::DuplicateCode,
            StoreError::Backend(message) => ServiceError::Persistence(message),
        }
    }
}

impl actix_web::ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::MissingUrl
            | ServiceError::InvalidUrlFormat
            | ServiceError::ValidityNotANumber
            | ServiceError::ValidityTooShort
            | ServiceError::ValidityTooLong
            | ServiceError::InvalidCodeFormat => StatusCode::BAD_REQUEST,
            ServiceError::DuplicateCode => StatusCode::CONFLICT,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Expired { .. } => StatusCode::GONE,
            ServiceError::GenerationExhausted | ServiceError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ServiceError::Expired { expired_at } => serde_json::json!({
                "error": self.kind(),
                "message": self.to_string(),
                "expiredAt": iso_millis(*expired_at),
            }),
            // Server-side faults leak no internal detail to the client.
            ServiceError::GenerationExhausted | ServiceError::Persistence(_) => {
                serde_json::json!({
                    "error": "internal_error",
                    "message": "internal server error",
                })
            }
            _ => serde_json::json!({
                "error": self.kind(),
                "message": self.to_string(),
            }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
