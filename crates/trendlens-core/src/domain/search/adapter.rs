//! Source adapter trait
//!
//! Each entity type is queryable through a narrow search primitive: a keyword
//! predicate over a bounded candidate set, scoped to the calling user. Adapters
//! return an empty sequence on "no results"; they fail only on data-access
//! errors (timeout, permission denial, malformed storage response).

use async_trait::async_trait;
use thiserror::Error;

use super::entity::{EntityType, RawCandidate, SearchFilters};

/// A data-access failure inside one source adapter
///
/// Recovered locally by the dispatcher: logged, contributes zero results,
/// never fails the overall search.
#[derive(Error, Debug)]
#[error("source '{entity}' failed: {message}")]
pub struct SourceError {
    /// The entity type of the failing source
    pub entity: EntityType,
    /// Underlying cause, stringified for logging
    pub message: String,
}

impl SourceError {
    pub fn new(entity: EntityType, message: impl Into<String>) -> Self {
        Self {
            entity,
            message: message.into(),
        }
    }
}

/// A per-entity-type data-access adapter
///
/// Responsible only for user scoping, a cheap keyword predicate over its
/// designated text fields, a default ordering suited to the entity, and
/// capping output at `limit`.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// The entity type this adapter serves
    fn entity_type(&self) -> EntityType;

    /// Fetch candidate records matching the keyword predicate
    async fn search(
        &self,
        user_id: &str,
        query: &str,
        filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<RawCandidate>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify trait is object-safe
    fn _assert_object_safe(_: &dyn SourceAdapter) {}

    #[test]
    fn test_source_error_display() {
        let err = SourceError::new(EntityType::Tag, "connection reset");
        assert_eq!(err.to_string(), "source 'tag' failed: connection reset");
    }
}
