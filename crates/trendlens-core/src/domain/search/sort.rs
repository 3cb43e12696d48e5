//! Sort engine
//!
//! Orders the filtered set by the requested key. The comparison is total:
//! ties are broken by ascending `id` so the final order is reproducible
//! regardless of underlying storage order. `sort_order` reverses the key
//! comparison, not the tie-break.

use std::cmp::Ordering;

use super::entity::{SearchResult, SortBy, SortOrder};

/// Sort results by the requested key and direction, in place
pub fn apply(results: &mut [SearchResult], sort_by: SortBy, sort_order: SortOrder) {
    results.sort_by(|a, b| compare(a, b, sort_by, sort_order));
}

fn compare(a: &SearchResult, b: &SearchResult, sort_by: SortBy, sort_order: SortOrder) -> Ordering {
    let key_order = match sort_by {
        SortBy::Relevance => a
            .relevance_score
            .partial_cmp(&b.relevance_score)
            .unwrap_or(Ordering::Equal),
        SortBy::Date => {
            // Absent timestamps fall back to epoch 0
            let a_ts = a.timestamp().map(|t| t.timestamp_millis()).unwrap_or(0);
            let b_ts = b.timestamp().map(|t| t.timestamp_millis()).unwrap_or(0);
            a_ts.cmp(&b_ts)
        }
        SortBy::Alphabetical => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    };

    let directed = match sort_order {
        SortOrder::Asc => key_order,
        SortOrder::Desc => key_order.reverse(),
    };

    // Tie-break by id ascending, never reversed
    directed.then_with(|| a.id.cmp(&b.id))
}
