use crate::db::Datastore;
use crate::errors::ServiceError;
use crate::services::codegen::{CODE_LENGTH, generate_candidate};
use crate::services::validation::validate_shortcode;

/// Attempt ceiling for the generate-and-check loop. With a 62^6 keyspace,
/// hitting it signals datastore trouble rather than bad luck.
pub const MAX_GENERATION_ATTEMPTS: u32 = 10;

/// Point read against the datastore. A pre-check only: the unique constraint
/// at insert time is the actual correctness backstop.
pub async fn is_unique(store: &dyn Datastore, code: &str) -> Result<bool, ServiceError> {
    let existing = store.find_url(code).await.map_err(ServiceError::from)?;
    Ok(existing.is_none())
}

/// Generate candidates until one is unused, bounded by `max_attempts`.
pub async fn resolve_unique_code(
    store: &dyn Datastore,
    max_attempts: u32,
) -> Result<String, ServiceError> {
    for _ in 0..max_attempts {
        let candidate = generate_candidate(CODE_LENGTH);
        if is_unique(store, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(ServiceError::GenerationExhausted)
}

/// Validate and uniqueness-check a user-supplied code.
pub async fn reserve_custom_code(store: &dyn Datastore, code: &str) -> Result<(), ServiceError> {
    if !validate_shortcode(code) {
        return Err(ServiceError::InvalidCodeFormat);
    }
    if !is_unique(store, code).await? {
        return Err(ServiceError::DuplicateCode);
    }
    Ok(())
}
