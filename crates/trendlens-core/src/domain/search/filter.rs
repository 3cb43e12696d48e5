//! Filter pipeline
//!
//! Applies post-hoc predicates over the merged result set: type allow-list,
//! date window, and minimum relevance. The predicates commute; the order is
//! fixed for determinism in tests.

use super::entity::{SearchFilters, SearchResult};

/// Apply the filter pipeline to a merged result set
pub fn apply(results: Vec<SearchResult>, filters: &SearchFilters) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|r| passes_type_allow_list(r, filters))
        .filter(|r| passes_date_window(r, filters))
        .filter(|r| passes_min_relevance(r, filters))
        .collect()
}

/// Type allow-list; an empty list lets every type pass
fn passes_type_allow_list(result: &SearchResult, filters: &SearchFilters) -> bool {
    filters.types.is_empty() || filters.types.contains(&result.entity_type)
}

/// Date window against the metadata-derived timestamp
///
/// Entries lacking a usable timestamp are dropped only when a window was
/// actually requested.
fn passes_date_window(result: &SearchResult, filters: &SearchFilters) -> bool {
    if !filters.has_date_window() {
        return true;
    }
    let Some(ts) = result.timestamp() else {
        return false;
    };
    if let Some(from) = filters.date_from {
        if ts < from {
            return false;
        }
    }
    if let Some(to) = filters.date_to {
        if ts > to {
            return false;
        }
    }
    true
}

/// Minimum relevance threshold
fn passes_min_relevance(result: &SearchResult, filters: &SearchFilters) -> bool {
    match filters.min_relevance {
        Some(min) => result.relevance_score >= min,
        None => true,
    }
}
