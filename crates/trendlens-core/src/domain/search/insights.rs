//! Insight generation
//!
//! Derives summary statistics, suggested follow-up terms, and related-search
//! strings from a final result set. Intentionally statistical, not ML-driven:
//! everything here is reproducible from the result set alone.

use std::collections::{HashMap, HashSet};

use super::entity::{EntityType, SearchInsights, SearchResult, SearchScope};

/// Results must score above this to contribute suggested terms
const SUGGESTION_SCORE_THRESHOLD: f64 = 70.0;

/// Minimum token length for a suggested term
const SUGGESTION_MIN_TOKEN_LEN: usize = 4;

/// Maximum number of suggested terms
const MAX_SUGGESTED_TERMS: usize = 5;

/// Maximum number of related queries
const MAX_RELATED_QUERIES: usize = 3;

/// Summarize a result set into insights
pub fn summarize(results: &[SearchResult], query: &str, scope: SearchScope) -> SearchInsights {
    let mut result_count_by_type: HashMap<EntityType, u32> = HashMap::new();
    for result in results {
        *result_count_by_type.entry(result.entity_type).or_insert(0) += 1;
    }

    let (top_relevance, average_relevance) = if results.is_empty() {
        (0.0, 0.0)
    } else {
        let top = results
            .iter()
            .map(|r| r.relevance_score)
            .fold(0.0_f64, f64::max);
        let sum: f64 = results.iter().map(|r| r.relevance_score).sum();
        (top, sum / results.len() as f64)
    };

    SearchInsights {
        result_count_by_type,
        top_relevance,
        average_relevance,
        suggested_terms: suggested_terms(results, query),
        related_queries: related_queries(query, scope),
    }
}

/// Collect follow-up terms from the titles of high-scoring results
///
/// Tokens longer than 3 characters, not already present in the query,
/// first-seen order, at most 5.
fn suggested_terms(results: &[SearchResult], query: &str) -> Vec<String> {
    let query_tokens: HashSet<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut terms = Vec::new();

    for result in results {
        if result.relevance_score <= SUGGESTION_SCORE_THRESHOLD {
            continue;
        }
        for token in result.title.to_lowercase().split_whitespace() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric());
            if token.chars().count() < SUGGESTION_MIN_TOKEN_LEN {
                continue;
            }
            if query_tokens.contains(token) || !seen.insert(token.to_string()) {
                continue;
            }
            terms.push(token.to_string());
            if terms.len() == MAX_SUGGESTED_TERMS {
                return terms;
            }
        }
    }

    terms
}

/// Scope-specific templated variants of the original query
fn related_queries(query: &str, scope: SearchScope) -> Vec<String> {
    let templates: Vec<String> = match scope {
        SearchScope::All => vec![
            format!("{} trends", query),
            format!("{} insights", query),
            format!("top {}", query),
        ],
        SearchScope::Entity(EntityType::Tag) => vec![
            format!("trending {}", query),
            format!("{} analytics", query),
            format!("{} competition", query),
        ],
        SearchScope::Entity(EntityType::Content) => vec![
            format!("{} captions", query),
            format!("best {} content", query),
            format!("{} engagement", query),
        ],
        SearchScope::Entity(EntityType::Post) => vec![
            format!("{} posts", query),
            format!("{} hashtags", query),
            format!("{} engagement", query),
        ],
        SearchScope::Entity(EntityType::Account)
        | SearchScope::Entity(EntityType::NotableAccount) => vec![
            format!("accounts like {}", query),
            format!("{} followers", query),
            format!("{} engagement", query),
        ],
        SearchScope::Entity(EntityType::Competitor) => vec![
            format!("{} strategy", query),
            format!("{} followers", query),
            format!("compare {}", query),
        ],
        SearchScope::Entity(EntityType::AnalyticsSnapshot) => vec![
            format!("{} report", query),
            format!("{} growth", query),
            format!("{} breakdown", query),
        ],
        SearchScope::Entity(EntityType::TeamMember) => vec![
            format!("{} role", query),
            format!("{} activity", query),
            format!("{} permissions", query),
        ],
        SearchScope::Entity(EntityType::Trend) => vec![
            format!("trending {}", query),
            format!("{} momentum", query),
            format!("{} forecast", query),
        ],
    };

    templates.into_iter().take(MAX_RELATED_QUERIES).collect()
}
