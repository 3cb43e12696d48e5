//! Search history recording
//!
//! Append-only audit trail of executed searches. Recording is best-effort:
//! the dispatcher runs it as a detached task and a failure here is logged,
//! never surfaced in the search response. The engine never reads the log;
//! the read path exists for the "recent searches" listing only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::entity::{SearchFilters, SearchHistoryEntry};

/// Write-only recorder for the search audit trail
#[async_trait]
pub trait HistoryRecorder: Send + Sync {
    /// Record that a search is starting; returns the entry id
    async fn record_start(
        &self,
        user_id: &str,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Uuid>;

    /// Fill in the result count once the search settled
    async fn record_outcome(&self, history_id: Uuid, result_count: u32) -> Result<()>;

    /// List the most recent entries for a user, newest first
    async fn recent(&self, user_id: &str, limit: u32) -> Result<Vec<SearchHistoryEntry>>;
}

/// SQLite-backed history recorder
#[derive(Debug, Clone)]
pub struct SqliteHistoryRecorder {
    pool: SqlitePool,
}

impl SqliteHistoryRecorder {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: String,
    user_id: String,
    query: String,
    filters: String,
    result_count: Option<i64>,
    executed_at: DateTime<Utc>,
}

impl HistoryRow {
    fn into_entry(self) -> Result<SearchHistoryEntry> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| Error::HistoryWrite(format!("invalid history id: {}", e)))?;
        let filters: SearchFilters = serde_json::from_str(&self.filters)
            .map_err(|e| Error::HistoryWrite(format!("invalid filters snapshot: {}", e)))?;
        Ok(SearchHistoryEntry {
            id,
            user_id: self.user_id,
            query: self.query,
            filters,
            result_count: self.result_count.map(|c| c as u32),
            executed_at: self.executed_at,
        })
    }
}

#[async_trait]
impl HistoryRecorder for SqliteHistoryRecorder {
    async fn record_start(
        &self,
        user_id: &str,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let filters_json = serde_json::to_string(filters)
            .map_err(|e| Error::HistoryWrite(format!("failed to serialize filters: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO search_history (id, user_id, query, filters, executed_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id)
        .bind(query)
        .bind(&filters_json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::HistoryWrite(e.to_string()))?;

        tracing::debug!(history_id = %id, user_id = %user_id, "Search history entry opened");
        Ok(id)
    }

    async fn record_outcome(&self, history_id: Uuid, result_count: u32) -> Result<()> {
        sqlx::query("UPDATE search_history SET result_count = ? WHERE id = ?")
            .bind(result_count as i64)
            .bind(history_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::HistoryWrite(e.to_string()))?;

        tracing::debug!(history_id = %history_id, result_count, "Search history outcome recorded");
        Ok(())
    }

    async fn recent(&self, user_id: &str, limit: u32) -> Result<Vec<SearchHistoryEntry>> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, query, filters, result_count, executed_at
            FROM search_history
            WHERE user_id = ?
            ORDER BY executed_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HistoryRow::into_entry).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    async fn create_recorder() -> SqliteHistoryRecorder {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        SqliteHistoryRecorder::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_record_start_and_outcome() {
        let recorder = create_recorder().await;
        let filters = SearchFilters::default();

        let id = recorder
            .record_start("user-1", "growth", &filters)
            .await
            .unwrap();
        recorder.record_outcome(id, 7).await.unwrap();

        let entries = recorder.recent("user-1", 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].query, "growth");
        assert_eq!(entries[0].result_count, Some(7));
    }

    #[tokio::test]
    async fn test_outcome_is_optional() {
        let recorder = create_recorder().await;
        let filters = SearchFilters::default();

        recorder
            .record_start("user-1", "growth", &filters)
            .await
            .unwrap();

        let entries = recorder.recent("user-1", 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].result_count, None);
    }

    #[tokio::test]
    async fn test_recent_is_user_scoped_and_limited() {
        let recorder = create_recorder().await;
        let filters = SearchFilters::default();

        for i in 0..5 {
            recorder
                .record_start("user-1", &format!("query {}", i), &filters)
                .await
                .unwrap();
        }
        recorder
            .record_start("user-2", "other", &filters)
            .await
            .unwrap();

        let entries = recorder.recent("user-1", 3).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.user_id == "user-1"));
    }

    #[tokio::test]
    async fn test_filters_snapshot_round_trip() {
        let recorder = create_recorder().await;
        let filters = SearchFilters {
            min_relevance: Some(75.0),
            ..Default::default()
        };

        recorder
            .record_start("user-1", "growth", &filters)
            .await
            .unwrap();

        let entries = recorder.recent("user-1", 1).await.unwrap();
        assert_eq!(entries[0].filters.min_relevance, Some(75.0));
    }
}
