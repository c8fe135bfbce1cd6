use serde_json::Value;
use url::Url;

use crate::errors::ServiceError;

pub const MIN_CODE_LENGTH: usize = 3;
pub const MAX_CODE_LENGTH: usize = 20;
pub const MIN_VALIDITY_MINUTES: i64 = 1;
pub const MAX_VALIDITY_MINUTES: i64 = 10_080;
pub const DEFAULT_VALIDITY_MINUTES: i64 = 30;

/// Syntax-only check: absolute URL with an explicit http/https scheme and a
/// host. No DNS, no network.
pub fn validate_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
        Err(_) => false,
    }
}

/// `^[A-Za-z0-9]{3,20}$`
pub fn validate_shortcode(code: &str) -> bool {
    (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Parse a requested validity period in minutes. Accepts a JSON integer or an
/// integer-looking string; absent means the default. Bounds are inclusive.
pub fn validate_validity_period(raw: Option<&Value>) -> Result<i64, ServiceError> {
    let minutes = match raw {
        None | Some(Value::Null) => DEFAULT_VALIDITY_MINUTES,
        Some(Value::Number(n)) => n.as_i64().ok_or(ServiceError::ValidityNotANumber)?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ServiceError::ValidityNotANumber)?,
        Some(_) => return Err(ServiceError::ValidityNotANumber),
    };

    if minutes < MIN_VALIDITY_MINUTES {
        return Err(ServiceError::ValidityTooShort);
    }
    if minutes > MAX_VALIDITY_MINUTES {
        return Err(ServiceError::ValidityTooLong);
    }
    Ok(minutes)
}
