//! Relevance scoring
//!
//! Pure two-tier textual match scoring between a query and a candidate text.
//! An exact substring hit scores on match position with a floor of 50; anything
//! else falls back to token-overlap scoring at lower confidence. The algorithm
//! is deliberately simple and reproducible; it is relied on by tests and must
//! not be swapped for stemming or edit-distance scoring without flagging the
//! behavior change.

/// Maximum relevance score
pub const MAX_SCORE: f64 = 100.0;

/// Floor score for any substring hit
const SUBSTRING_FLOOR: f64 = 50.0;

/// Weight of the token-overlap tier
const TOKEN_OVERLAP_WEIGHT: f64 = 40.0;

/// Score a candidate text against a query. Deterministic, no I/O.
///
/// Returns a value in `[0, 100]`:
/// - empty candidate scores 0
/// - substring hit: `max(50, 100 - 2 * match_position)` (earlier is better)
/// - otherwise: `(matching_token_pairs / query_token_count) * 40`
pub fn score(query: &str, candidate_text: &str) -> f64 {
    let query = query.to_lowercase();
    let candidate = candidate_text.to_lowercase();

    if candidate.is_empty() {
        return 0.0;
    }

    if let Some(byte_pos) = candidate.find(&query) {
        let position = candidate[..byte_pos].chars().count();
        let base = MAX_SCORE - 2.0 * position as f64;
        return base.max(SUBSTRING_FLOOR).clamp(0.0, MAX_SCORE);
    }

    let query_tokens: Vec<&str> = query.split_whitespace().collect();
    if query_tokens.is_empty() {
        return 0.0;
    }
    let candidate_tokens: Vec<&str> = candidate.split_whitespace().collect();

    let mut match_count = 0u32;
    for query_token in &query_tokens {
        for candidate_token in &candidate_tokens {
            if candidate_token.contains(query_token) || query_token.contains(candidate_token) {
                match_count += 1;
            }
        }
    }

    let overlap = (f64::from(match_count) / query_tokens.len() as f64) * TOKEN_OVERLAP_WEIGHT;
    overlap.clamp(0.0, MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbatim_prefix_scores_max() {
        assert_eq!(score("growth", "growth trend analysis"), 100.0);
        assert_eq!(score("Growth", "GROWTH report"), 100.0);
    }

    #[test]
    fn test_earlier_matches_score_higher() {
        let early = score("growth", "account growth report");
        let late = score("growth", "the quarterly account growth report");
        assert!(early > late || (early == 50.0 && late == 50.0));
        assert_eq!(score("growth", "a growth tip"), 96.0); // position 2
    }

    #[test]
    fn test_substring_floor_is_fifty() {
        // Match deep into the candidate still scores at least 50
        let candidate = format!("{}growth", "x".repeat(60));
        assert_eq!(score("growth", &candidate), 50.0);
    }

    #[test]
    fn test_empty_candidate_scores_zero() {
        assert_eq!(score("growth", ""), 0.0);
    }

    #[test]
    fn test_token_overlap_partial_match() {
        // No substring hit for the full query; one of two query tokens overlaps
        let s = score("growth metrics", "metrics dashboard");
        assert!((s - 20.0).abs() < f64::EPSILON, "got {}", s);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        assert_eq!(score("xyznotfound", "account growth report"), 0.0);
    }

    #[test]
    fn test_score_always_bounded() {
        let cases = [
            ("", ""),
            ("a", "a a a a a a a a a a"),
            ("growth tips for social accounts", "growth"),
            ("  spaced   out  ", "spaced out"),
            ("unicode é", "café société é"),
        ];
        for (q, c) in cases {
            let s = score(q, c);
            assert!((0.0..=100.0).contains(&s), "score({:?}, {:?}) = {}", q, c, s);
        }
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let a = score("growth metrics", "weekly growth metrics digest");
        let b = score("growth metrics", "weekly growth metrics digest");
        assert_eq!(a, b);
    }
}
