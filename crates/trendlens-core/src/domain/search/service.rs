//! Search engine orchestration
//!
//! The dispatcher validates a query, fans out to the source adapters for the
//! requested scope, and assembles the response envelope. Adapters run
//! concurrently, each under an independent timeout, and are joined with
//! all-settled semantics: one failing or slow source degrades completeness
//! but never fails the search. History recording runs as a detached task and
//! is never awaited by the response path.

use futures_util::future::join_all;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::error::{Error, Result};

use super::adapter::SourceAdapter;
use super::entity::{
    RawCandidate, SearchQuery, SearchResponse, SearchResult, SearchScope,
};
use super::history::{HistoryRecorder, SqliteHistoryRecorder};
use super::repository::all_adapters;
use super::{filter, insights, scoring, sort};

/// Federated search engine
#[derive(Clone)]
pub struct SearchEngine {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    history: Arc<dyn HistoryRecorder>,
    config: SearchConfig,
}

impl SearchEngine {
    /// Create an engine over a SQLite pool with the standard adapter set
    pub fn new(pool: SqlitePool, config: SearchConfig) -> Self {
        Self {
            adapters: all_adapters(pool.clone()),
            history: Arc::new(SqliteHistoryRecorder::new(pool)),
            config,
        }
    }

    /// Create an engine from explicit parts (custom adapters or recorder)
    pub fn with_parts(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        history: Arc<dyn HistoryRecorder>,
        config: SearchConfig,
    ) -> Self {
        Self {
            adapters,
            history,
            config,
        }
    }

    /// Execute a search and assemble the response envelope
    ///
    /// Returns a validation error before any adapter is invoked, an internal
    /// error if an engine invariant is violated, and otherwise a complete
    /// `SearchResponse` even when some sources failed or timed out.
    pub async fn dispatch(&self, query: &SearchQuery, user_id: &str) -> Result<SearchResponse> {
        let started = Instant::now();

        self.validate(query, user_id)?;

        let selected = self.resolve_adapters(query.scope)?;
        let per_source_limit = self.per_source_limit(query, selected.len());

        // History start runs detached; the handle is only consumed by the
        // equally-detached outcome task below.
        let start_handle = {
            let history = Arc::clone(&self.history);
            let user_id = user_id.to_string();
            let text = query.text.clone();
            let filters = query.filters.clone();
            tokio::spawn(async move {
                match history.record_start(&user_id, &text, &filters).await {
                    Ok(id) => Some(id),
                    Err(e) => {
                        warn!(error = %e, "Failed to record search start");
                        None
                    }
                }
            })
        };

        let candidates = self
            .fan_out(&selected, user_id, query, per_source_limit)
            .await;

        let merged = self.normalize(&query.text, candidates)?;
        let total_count = merged.len() as u32;

        let filtered = filter::apply(merged, &query.filters);
        let filtered_count = filtered.len() as u32;

        let mut results = filtered;
        sort::apply(&mut results, query.filters.sort_by, query.filters.sort_order);
        results.truncate(query.result_limit as usize);

        let insights = insights::summarize(&results, &query.text, query.scope);

        let result_count = results.len() as u32;
        {
            let history = Arc::clone(&self.history);
            tokio::spawn(async move {
                if let Ok(Some(history_id)) = start_handle.await {
                    if let Err(e) = history.record_outcome(history_id, result_count).await {
                        warn!(error = %e, "Failed to record search outcome");
                    }
                }
            });
        }

        let response = SearchResponse {
            results,
            total_count,
            filtered_count,
            insights,
            generated_at: chrono::Utc::now(),
            execution_time_ms: started.elapsed().as_millis() as u64,
        };

        debug!(
            query = %query.text,
            scope = %query.scope,
            total = response.total_count,
            filtered = response.filtered_count,
            returned = response.results.len(),
            elapsed_ms = response.execution_time_ms,
            "Search dispatched"
        );

        Ok(response)
    }

    /// Pre-dispatch validation; rejected queries never reach an adapter
    fn validate(&self, query: &SearchQuery, user_id: &str) -> Result<()> {
        if user_id.trim().is_empty() {
            return Err(Error::Unauthorized);
        }
        if query.text.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        if query.result_limit == 0 || query.result_limit > self.config.max_limit {
            return Err(Error::InvalidLimit(query.result_limit, self.config.max_limit));
        }
        Ok(())
    }

    /// Resolve the adapter set for a scope
    fn resolve_adapters(&self, scope: SearchScope) -> Result<Vec<Arc<dyn SourceAdapter>>> {
        match scope {
            SearchScope::All => Ok(self.adapters.clone()),
            SearchScope::Entity(entity_type) => {
                let adapter = self
                    .adapters
                    .iter()
                    .find(|a| a.entity_type() == entity_type)
                    .cloned()
                    .ok_or_else(|| {
                        Error::Internal(format!("no adapter registered for '{}'", entity_type))
                    })?;
                Ok(vec![adapter])
            }
        }
    }

    /// Per-source cap: full limit for a singular scope, split across sources
    /// (with a floor) when federated
    fn per_source_limit(&self, query: &SearchQuery, source_count: usize) -> u32 {
        if source_count <= 1 {
            query.result_limit
        } else {
            (query.result_limit / source_count as u32).max(self.config.min_per_source)
        }
    }

    /// Invoke every selected adapter concurrently and join all-settled
    ///
    /// Each task runs under an independent timeout; expiry discards the
    /// source's output. Failures are logged and contribute zero results.
    /// Dropping the returned future cancels every in-flight adapter call.
    async fn fan_out(
        &self,
        selected: &[Arc<dyn SourceAdapter>],
        user_id: &str,
        query: &SearchQuery,
        per_source_limit: u32,
    ) -> Vec<RawCandidate> {
        let timeout = Duration::from_millis(self.config.adapter_timeout_ms);

        let tasks = selected.iter().map(|adapter| {
            let adapter = Arc::clone(adapter);
            let user_id = user_id.to_string();
            let text = query.text.clone();
            let filters = query.filters.clone();
            async move {
                let entity = adapter.entity_type();
                let outcome = tokio::time::timeout(
                    timeout,
                    adapter.search(&user_id, &text, &filters, per_source_limit),
                )
                .await;
                (entity, outcome)
            }
        });

        let outcomes = join_all(tasks).await;

        let mut merged = Vec::new();
        for (entity, outcome) in outcomes {
            match outcome {
                Ok(Ok(candidates)) => {
                    debug!(source = %entity, count = candidates.len(), "Source returned candidates");
                    merged.extend(candidates);
                }
                Ok(Err(e)) => {
                    warn!(source = %entity, error = %e, "Source failed; contributing zero results");
                }
                Err(_) => {
                    warn!(
                        source = %entity,
                        timeout_ms = self.config.adapter_timeout_ms,
                        "Source timed out; discarding partial output"
                    );
                }
            }
        }
        merged
    }

    /// Score each raw candidate and produce the uniform result envelope
    ///
    /// A non-finite score means the engine itself is compromised and fails
    /// the whole request.
    fn normalize(&self, query_text: &str, candidates: Vec<RawCandidate>) -> Result<Vec<SearchResult>> {
        candidates
            .into_iter()
            .map(|c| {
                let score = scoring::score(query_text, &c.search_text);
                if !score.is_finite() {
                    return Err(Error::Internal(format!(
                        "scorer produced a non-finite value for candidate '{}'",
                        c.id
                    )));
                }
                Ok(SearchResult {
                    entity_type: c.entity_type,
                    id: c.id,
                    title: c.title,
                    subtitle: c.subtitle,
                    description: c.description,
                    metadata: c.metadata,
                    relevance_score: score,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::adapter::SourceError;
    use crate::domain::search::entity::{
        EntityType, ResultMetadata, SearchFilters, SortBy, SortOrder,
    };
    use crate::storage::Database;
    use async_trait::async_trait;

    /// Adapter returning a fixed candidate list
    struct StaticAdapter {
        entity: EntityType,
        candidates: Vec<RawCandidate>,
    }

    #[async_trait]
    impl SourceAdapter for StaticAdapter {
        fn entity_type(&self) -> EntityType {
            self.entity
        }

        async fn search(
            &self,
            _user_id: &str,
            _query: &str,
            _filters: &SearchFilters,
            limit: u32,
        ) -> std::result::Result<Vec<RawCandidate>, SourceError> {
            let mut out = self.candidates.clone();
            out.truncate(limit as usize);
            Ok(out)
        }
    }

    /// Adapter that always fails with a data-access error
    struct FailingAdapter {
        entity: EntityType,
    }

    #[async_trait]
    impl SourceAdapter for FailingAdapter {
        fn entity_type(&self) -> EntityType {
            self.entity
        }

        async fn search(
            &self,
            _user_id: &str,
            _query: &str,
            _filters: &SearchFilters,
            _limit: u32,
        ) -> std::result::Result<Vec<RawCandidate>, SourceError> {
            Err(SourceError::new(self.entity, "storage unavailable"))
        }
    }

    /// Adapter that sleeps past any reasonable timeout before answering
    struct SlowAdapter {
        entity: EntityType,
        delay_ms: u64,
    }

    #[async_trait]
    impl SourceAdapter for SlowAdapter {
        fn entity_type(&self) -> EntityType {
            self.entity
        }

        async fn search(
            &self,
            _user_id: &str,
            _query: &str,
            _filters: &SearchFilters,
            _limit: u32,
        ) -> std::result::Result<Vec<RawCandidate>, SourceError> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            Ok(vec![candidate(self.entity, "slow-1", "Slow Growth Result")])
        }
    }

    fn candidate(entity: EntityType, id: &str, title: &str) -> RawCandidate {
        RawCandidate {
            entity_type: entity,
            id: id.into(),
            title: title.into(),
            subtitle: String::new(),
            description: String::new(),
            search_text: title.to_string(),
            metadata: ResultMetadata::Trend {
                momentum: 1.0,
                first_seen_at: None,
            },
        }
    }

    async fn recorder() -> Arc<dyn HistoryRecorder> {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        Arc::new(SqliteHistoryRecorder::new(db.pool().clone()))
    }

    fn config() -> SearchConfig {
        SearchConfig {
            adapter_timeout_ms: 200,
            default_limit: 50,
            max_limit: 200,
            min_per_source: 5,
        }
    }

    async fn engine_with(adapters: Vec<Arc<dyn SourceAdapter>>) -> SearchEngine {
        SearchEngine::with_parts(adapters, recorder().await, config())
    }

    #[tokio::test]
    async fn test_federated_search_merges_and_sorts() {
        // Scenario: two sources each return one "growth" candidate
        let engine = engine_with(vec![
            Arc::new(StaticAdapter {
                entity: EntityType::Trend,
                candidates: vec![candidate(EntityType::Trend, "t1", "Growth Trend Analysis")],
            }),
            Arc::new(StaticAdapter {
                entity: EntityType::AnalyticsSnapshot,
                candidates: vec![candidate(
                    EntityType::AnalyticsSnapshot,
                    "a1",
                    "Account Growth Report",
                )],
            }),
        ])
        .await;

        let query = SearchQuery::new("growth");
        let response = engine.dispatch(&query, "user-1").await.unwrap();

        assert_eq!(response.results.len(), 2);
        assert!(response.results.iter().all(|r| r.relevance_score >= 50.0));
        // "Growth Trend Analysis" is a prefix match (100) and sorts first
        assert_eq!(response.results[0].id, "t1");
        assert_eq!(response.results[1].id, "a1");
        assert_eq!(response.total_count, 2);
        assert_eq!(response.filtered_count, 2);
    }

    #[tokio::test]
    async fn test_no_matches_yields_empty_envelope() {
        let engine = engine_with(vec![Arc::new(StaticAdapter {
            entity: EntityType::Trend,
            candidates: vec![],
        })])
        .await;

        let query = SearchQuery::new("xyznotfound");
        let response = engine.dispatch(&query, "user-1").await.unwrap();

        assert!(response.results.is_empty());
        assert_eq!(response.total_count, 0);
        assert_eq!(response.insights.average_relevance, 0.0);
        assert!(response.insights.suggested_terms.is_empty());
    }

    #[tokio::test]
    async fn test_failing_source_does_not_fail_the_search() {
        let engine = engine_with(vec![
            Arc::new(FailingAdapter {
                entity: EntityType::Post,
            }),
            Arc::new(StaticAdapter {
                entity: EntityType::Trend,
                candidates: vec![candidate(EntityType::Trend, "t1", "Growth Trend Analysis")],
            }),
        ])
        .await;

        let query = SearchQuery::new("growth");
        let response = engine.dispatch(&query, "user-1").await.unwrap();

        // Only the healthy source contributes; totals reflect that
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].id, "t1");
        assert_eq!(response.total_count, 1);
    }

    #[tokio::test]
    async fn test_timed_out_source_is_discarded() {
        let engine = engine_with(vec![
            Arc::new(SlowAdapter {
                entity: EntityType::Post,
                delay_ms: 5_000,
            }),
            Arc::new(StaticAdapter {
                entity: EntityType::Trend,
                candidates: vec![candidate(EntityType::Trend, "t1", "Growth Trend Analysis")],
            }),
        ])
        .await;

        let query = SearchQuery::new("growth");
        let response = engine.dispatch(&query, "user-1").await.unwrap();

        assert_eq!(response.results.len(), 1);
        assert!(response.results.iter().all(|r| r.id != "slow-1"));
    }

    #[tokio::test]
    async fn test_singular_scope_selects_one_adapter() {
        let engine = engine_with(vec![
            Arc::new(StaticAdapter {
                entity: EntityType::Trend,
                candidates: vec![candidate(EntityType::Trend, "t1", "Growth Trend Analysis")],
            }),
            Arc::new(StaticAdapter {
                entity: EntityType::Post,
                candidates: vec![candidate(EntityType::Post, "p1", "Growth Post")],
            }),
        ])
        .await;

        let query = SearchQuery::new("growth").with_scope(SearchScope::Entity(EntityType::Post));
        let response = engine.dispatch(&query, "user-1").await.unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].entity_type, EntityType::Post);
    }

    #[tokio::test]
    async fn test_type_allow_list_under_federated_scope() {
        // Scenario: scope "all" but filters restrict to trends
        let engine = engine_with(vec![
            Arc::new(StaticAdapter {
                entity: EntityType::Trend,
                candidates: vec![candidate(EntityType::Trend, "t1", "Growth Trend Analysis")],
            }),
            Arc::new(StaticAdapter {
                entity: EntityType::Post,
                candidates: vec![candidate(EntityType::Post, "p1", "Growth Post")],
            }),
        ])
        .await;

        let query = SearchQuery::new("growth").with_filters(SearchFilters {
            types: vec![EntityType::Trend],
            ..Default::default()
        });
        let response = engine.dispatch(&query, "user-1").await.unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].entity_type, EntityType::Trend);
        // The post candidate was merged before filtering
        assert_eq!(response.total_count, 2);
        assert_eq!(response.filtered_count, 1);
    }

    #[tokio::test]
    async fn test_min_relevance_filter_applied_after_merge() {
        let engine = engine_with(vec![Arc::new(StaticAdapter {
            entity: EntityType::Trend,
            candidates: vec![
                candidate(EntityType::Trend, "t1", "growth hacking weekly"),
                candidate(EntityType::Trend, "t2", "unrelated topic entirely"),
            ],
        })])
        .await;

        let query = SearchQuery::new("growth").with_filters(SearchFilters {
            min_relevance: Some(80.0),
            ..Default::default()
        });
        let response = engine.dispatch(&query, "user-1").await.unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].id, "t1");
        assert!(response.filtered_count <= response.total_count);
    }

    #[tokio::test]
    async fn test_result_limit_bounds_output() {
        let candidates: Vec<RawCandidate> = (0..20)
            .map(|i| candidate(EntityType::Trend, &format!("t{:02}", i), "growth topic"))
            .collect();
        let engine = engine_with(vec![Arc::new(StaticAdapter {
            entity: EntityType::Trend,
            candidates,
        })])
        .await;

        let query = SearchQuery::new("growth").with_limit(5);
        let response = engine.dispatch(&query, "user-1").await.unwrap();

        assert_eq!(response.results.len(), 5);
        assert!(response.results.len() as u32 <= response.filtered_count);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let engine = engine_with(vec![]).await;

        let err = engine
            .dispatch(&SearchQuery::new("   "), "user-1")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "EMPTY_QUERY");

        let err = engine
            .dispatch(&SearchQuery::new("growth"), "  ")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");

        let err = engine
            .dispatch(&SearchQuery::new("growth").with_limit(0), "user-1")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_LIMIT");

        let err = engine
            .dispatch(&SearchQuery::new("growth").with_limit(500), "user-1")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_LIMIT");
    }

    #[tokio::test]
    async fn test_sort_key_and_order_respected() {
        let engine = engine_with(vec![Arc::new(StaticAdapter {
            entity: EntityType::Trend,
            candidates: vec![
                candidate(EntityType::Trend, "t1", "banana growth"),
                candidate(EntityType::Trend, "t2", "apple growth"),
            ],
        })])
        .await;

        let query = SearchQuery::new("growth").with_sort(SortBy::Alphabetical, SortOrder::Asc);
        let response = engine.dispatch(&query, "user-1").await.unwrap();

        assert_eq!(response.results[0].title, "apple growth");
        assert_eq!(response.results[1].title, "banana growth");
    }

    #[tokio::test]
    async fn test_history_is_recorded_without_blocking() {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        let history = Arc::new(SqliteHistoryRecorder::new(db.pool().clone()));
        let engine = SearchEngine::with_parts(
            vec![Arc::new(StaticAdapter {
                entity: EntityType::Trend,
                candidates: vec![candidate(EntityType::Trend, "t1", "Growth Trend Analysis")],
            })],
            history.clone(),
            config(),
        );

        let query = SearchQuery::new("growth");
        engine.dispatch(&query, "user-1").await.unwrap();

        // The recorder runs detached; poll briefly for it to settle
        let mut recorded = None;
        for _ in 0..100 {
            let entries = history.recent("user-1", 10).await.unwrap();
            if let Some(entry) = entries.first() {
                if entry.result_count.is_some() {
                    recorded = Some(entry.clone());
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let entry = recorded.expect("history entry never settled");
        assert_eq!(entry.query, "growth");
        assert_eq!(entry.result_count, Some(1));
    }

    #[tokio::test]
    async fn test_end_to_end_over_sqlite_adapters() {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        let pool = db.pool().clone();

        sqlx::query(
            "INSERT INTO trends (id, user_id, topic, description, momentum) VALUES ('tr1', 'user-1', 'Growth Trend Analysis', '', 4.2)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO content_items (id, user_id, title, caption, like_count) VALUES ('c1', 'user-1', 'Account Growth Report', 'quarterly numbers', 10)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let engine = SearchEngine::new(pool, config());
        let response = engine
            .dispatch(&SearchQuery::new("growth"), "user-1")
            .await
            .unwrap();

        assert_eq!(response.results.len(), 2);
        assert!(response.results.iter().all(|r| r.relevance_score >= 50.0));
        assert_eq!(response.results[0].title, "Growth Trend Analysis");
    }
}
