//! SQLite source adapters
//!
//! One adapter per entity type. Each restricts candidates to rows owned by
//! the calling user, applies a `LIKE` keyword predicate over its designated
//! text fields, orders by a column suited to the entity, and caps output at
//! the requested limit. "No results" is an empty vector, never an error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use super::adapter::{SourceAdapter, SourceError};
use super::entity::{EntityType, RawCandidate, ResultMetadata, SearchFilters};

/// Build a `LIKE` pattern for a keyword, escaping SQL wildcards
fn like_pattern(query: &str) -> String {
    let escaped = query.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Construct one adapter per entity type over a shared pool
pub fn all_adapters(pool: SqlitePool) -> Vec<Arc<dyn SourceAdapter>> {
    vec![
        Arc::new(TagAdapter::new(pool.clone())),
        Arc::new(ContentAdapter::new(pool.clone())),
        Arc::new(NotableAccountAdapter::new(pool.clone())),
        Arc::new(CompetitorAdapter::new(pool.clone())),
        Arc::new(AnalyticsSnapshotAdapter::new(pool.clone())),
        Arc::new(TeamMemberAdapter::new(pool.clone())),
        Arc::new(PostAdapter::new(pool.clone())),
        Arc::new(AccountAdapter::new(pool.clone())),
        Arc::new(TrendAdapter::new(pool)),
    ]
}

// ========== Tags ==========

/// Adapter over tracked hashtags, ordered by usage count
#[derive(Debug, Clone)]
pub struct TagAdapter {
    pool: SqlitePool,
}

impl TagAdapter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    id: String,
    name: String,
    category: String,
    usage_count: i64,
    last_used_at: Option<DateTime<Utc>>,
}

impl TagRow {
    fn into_candidate(self) -> RawCandidate {
        let search_text = format!("{} {}", self.name, self.category);
        RawCandidate {
            entity_type: EntityType::Tag,
            id: self.id,
            title: self.name,
            subtitle: self.category.clone(),
            description: format!("Used {} times", self.usage_count),
            search_text,
            metadata: ResultMetadata::Tag {
                category: self.category,
                usage_count: self.usage_count,
                last_used_at: self.last_used_at,
            },
        }
    }
}

#[async_trait]
impl SourceAdapter for TagAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::Tag
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        _filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        let pattern = like_pattern(query);
        let rows: Vec<TagRow> = sqlx::query_as(
            r#"
            SELECT id, name, category, usage_count, last_used_at
            FROM tags
            WHERE user_id = ?
              AND (name LIKE ? ESCAPE '\' OR category LIKE ? ESCAPE '\')
            ORDER BY usage_count DESC, id ASC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SourceError::new(EntityType::Tag, e.to_string()))?;

        Ok(rows.into_iter().map(TagRow::into_candidate).collect())
    }
}

// ========== Content items ==========

/// Adapter over saved content items, ordered by like count
#[derive(Debug, Clone)]
pub struct ContentAdapter {
    pool: SqlitePool,
}

impl ContentAdapter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContentRow {
    id: String,
    title: String,
    caption: String,
    media_type: String,
    like_count: i64,
    comment_count: i64,
    posted_at: Option<DateTime<Utc>>,
}

impl ContentRow {
    fn into_candidate(self) -> RawCandidate {
        let search_text = format!("{} {}", self.title, self.caption);
        RawCandidate {
            entity_type: EntityType::Content,
            id: self.id,
            title: self.title,
            subtitle: self.media_type.clone(),
            description: self.caption,
            search_text,
            metadata: ResultMetadata::Content {
                media_type: self.media_type,
                like_count: self.like_count,
                comment_count: self.comment_count,
                posted_at: self.posted_at,
            },
        }
    }
}

#[async_trait]
impl SourceAdapter for ContentAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::Content
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        _filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        let pattern = like_pattern(query);
        let rows: Vec<ContentRow> = sqlx::query_as(
            r#"
            SELECT id, title, caption, media_type, like_count, comment_count, posted_at
            FROM content_items
            WHERE user_id = ?
              AND (title LIKE ? ESCAPE '\' OR caption LIKE ? ESCAPE '\')
            ORDER BY like_count DESC, id ASC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SourceError::new(EntityType::Content, e.to_string()))?;

        Ok(rows.into_iter().map(ContentRow::into_candidate).collect())
    }
}

// ========== Notable accounts ==========

/// Adapter over curated notable accounts, ordered by follower count
#[derive(Debug, Clone)]
pub struct NotableAccountAdapter {
    pool: SqlitePool,
}

impl NotableAccountAdapter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NotableAccountRow {
    id: String,
    username: String,
    niche: String,
    follower_count: i64,
    engagement_rate: f64,
    noted_at: Option<DateTime<Utc>>,
}

impl NotableAccountRow {
    fn into_candidate(self) -> RawCandidate {
        let search_text = format!("{} {}", self.username, self.niche);
        RawCandidate {
            entity_type: EntityType::NotableAccount,
            id: self.id,
            title: self.username,
            subtitle: self.niche.clone(),
            description: format!("{} followers", self.follower_count),
            search_text,
            metadata: ResultMetadata::NotableAccount {
                niche: self.niche,
                follower_count: self.follower_count,
                engagement_rate: self.engagement_rate,
                noted_at: self.noted_at,
            },
        }
    }
}

#[async_trait]
impl SourceAdapter for NotableAccountAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::NotableAccount
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        _filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        let pattern = like_pattern(query);
        let rows: Vec<NotableAccountRow> = sqlx::query_as(
            r#"
            SELECT id, username, niche, follower_count, engagement_rate, noted_at
            FROM notable_accounts
            WHERE user_id = ?
              AND (username LIKE ? ESCAPE '\' OR niche LIKE ? ESCAPE '\')
            ORDER BY follower_count DESC, id ASC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SourceError::new(EntityType::NotableAccount, e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(NotableAccountRow::into_candidate)
            .collect())
    }
}

// ========== Competitors ==========

/// Adapter over tracked competitors, ordered by follower count
#[derive(Debug, Clone)]
pub struct CompetitorAdapter {
    pool: SqlitePool,
}

impl CompetitorAdapter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CompetitorRow {
    id: String,
    name: String,
    handle: String,
    follower_count: i64,
    tracked_since: Option<DateTime<Utc>>,
}

impl CompetitorRow {
    fn into_candidate(self) -> RawCandidate {
        let search_text = format!("{} {}", self.name, self.handle);
        RawCandidate {
            entity_type: EntityType::Competitor,
            id: self.id,
            title: self.name,
            subtitle: self.handle.clone(),
            description: format!("{} followers", self.follower_count),
            search_text,
            metadata: ResultMetadata::Competitor {
                handle: self.handle,
                follower_count: self.follower_count,
                tracked_since: self.tracked_since,
            },
        }
    }
}

#[async_trait]
impl SourceAdapter for CompetitorAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::Competitor
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        _filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        let pattern = like_pattern(query);
        let rows: Vec<CompetitorRow> = sqlx::query_as(
            r#"
            SELECT id, name, handle, follower_count, tracked_since
            FROM competitors
            WHERE user_id = ?
              AND (name LIKE ? ESCAPE '\' OR handle LIKE ? ESCAPE '\')
            ORDER BY follower_count DESC, id ASC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SourceError::new(EntityType::Competitor, e.to_string()))?;

        Ok(rows.into_iter().map(CompetitorRow::into_candidate).collect())
    }
}

// ========== Analytics snapshots ==========

/// Adapter over periodic analytics snapshots, most recent first
#[derive(Debug, Clone)]
pub struct AnalyticsSnapshotAdapter {
    pool: SqlitePool,
}

impl AnalyticsSnapshotAdapter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AnalyticsSnapshotRow {
    id: String,
    period_label: String,
    summary: String,
    follower_delta: i64,
    engagement_rate: f64,
    captured_at: Option<DateTime<Utc>>,
}

impl AnalyticsSnapshotRow {
    fn into_candidate(self) -> RawCandidate {
        let search_text = format!("{} {}", self.period_label, self.summary);
        RawCandidate {
            entity_type: EntityType::AnalyticsSnapshot,
            id: self.id,
            title: self.period_label,
            subtitle: format!("{:+} followers", self.follower_delta),
            description: self.summary,
            search_text,
            metadata: ResultMetadata::AnalyticsSnapshot {
                follower_delta: self.follower_delta,
                engagement_rate: self.engagement_rate,
                captured_at: self.captured_at,
            },
        }
    }
}

#[async_trait]
impl SourceAdapter for AnalyticsSnapshotAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::AnalyticsSnapshot
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        _filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        let pattern = like_pattern(query);
        let rows: Vec<AnalyticsSnapshotRow> = sqlx::query_as(
            r#"
            SELECT id, period_label, summary, follower_delta, engagement_rate, captured_at
            FROM analytics_snapshots
            WHERE user_id = ?
              AND (period_label LIKE ? ESCAPE '\' OR summary LIKE ? ESCAPE '\')
            ORDER BY captured_at DESC, id ASC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SourceError::new(EntityType::AnalyticsSnapshot, e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(AnalyticsSnapshotRow::into_candidate)
            .collect())
    }
}

// ========== Team members ==========

/// Adapter over workspace team members, ordered by name
#[derive(Debug, Clone)]
pub struct TeamMemberAdapter {
    pool: SqlitePool,
}

impl TeamMemberAdapter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TeamMemberRow {
    id: String,
    name: String,
    role: String,
    email: String,
    joined_at: Option<DateTime<Utc>>,
}

impl TeamMemberRow {
    fn into_candidate(self) -> RawCandidate {
        let search_text = format!("{} {} {}", self.name, self.role, self.email);
        RawCandidate {
            entity_type: EntityType::TeamMember,
            id: self.id,
            title: self.name,
            subtitle: self.role.clone(),
            description: self.email.clone(),
            search_text,
            metadata: ResultMetadata::TeamMember {
                role: self.role,
                email: self.email,
                joined_at: self.joined_at,
            },
        }
    }
}

#[async_trait]
impl SourceAdapter for TeamMemberAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::TeamMember
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        _filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        let pattern = like_pattern(query);
        let rows: Vec<TeamMemberRow> = sqlx::query_as(
            r#"
            SELECT id, name, role, email, joined_at
            FROM team_members
            WHERE user_id = ?
              AND (name LIKE ? ESCAPE '\' OR role LIKE ? ESCAPE '\' OR email LIKE ? ESCAPE '\')
            ORDER BY name ASC, id ASC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SourceError::new(EntityType::TeamMember, e.to_string()))?;

        Ok(rows.into_iter().map(TeamMemberRow::into_candidate).collect())
    }
}

// ========== Posts ==========

/// Adapter over published posts, most recent first
#[derive(Debug, Clone)]
pub struct PostAdapter {
    pool: SqlitePool,
}

impl PostAdapter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: String,
    caption: String,
    hashtags: String,
    like_count: i64,
    posted_at: Option<DateTime<Utc>>,
}

impl PostRow {
    fn into_candidate(self) -> RawCandidate {
        let search_text = format!("{} {}", self.caption, self.hashtags);
        RawCandidate {
            entity_type: EntityType::Post,
            id: self.id,
            title: self.caption.clone(),
            subtitle: self.hashtags.clone(),
            description: format!("{} likes", self.like_count),
            search_text,
            metadata: ResultMetadata::Post {
                hashtags: self.hashtags,
                like_count: self.like_count,
                posted_at: self.posted_at,
            },
        }
    }
}

#[async_trait]
impl SourceAdapter for PostAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::Post
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        _filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        let pattern = like_pattern(query);
        let rows: Vec<PostRow> = sqlx::query_as(
            r#"
            SELECT id, caption, hashtags, like_count, posted_at
            FROM posts
            WHERE user_id = ?
              AND (caption LIKE ? ESCAPE '\' OR hashtags LIKE ? ESCAPE '\')
            ORDER BY posted_at DESC, id ASC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SourceError::new(EntityType::Post, e.to_string()))?;

        Ok(rows.into_iter().map(PostRow::into_candidate).collect())
    }
}

// ========== Accounts ==========

/// Adapter over connected social accounts, ordered by follower count
#[derive(Debug, Clone)]
pub struct AccountAdapter {
    pool: SqlitePool,
}

impl AccountAdapter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: String,
    username: String,
    display_name: String,
    platform: String,
    follower_count: i64,
    media_count: i64,
    connected_at: Option<DateTime<Utc>>,
}

impl AccountRow {
    fn into_candidate(self) -> RawCandidate {
        let search_text = format!("{} {}", self.username, self.display_name);
        RawCandidate {
            entity_type: EntityType::Account,
            id: self.id,
            title: self.display_name.clone(),
            subtitle: format!("@{} on {}", self.username, self.platform),
            description: format!("{} followers", self.follower_count),
            search_text,
            metadata: ResultMetadata::Account {
                platform: self.platform,
                follower_count: self.follower_count,
                media_count: self.media_count,
                connected_at: self.connected_at,
            },
        }
    }
}

#[async_trait]
impl SourceAdapter for AccountAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::Account
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        _filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        let pattern = like_pattern(query);
        let rows: Vec<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, username, display_name, platform, follower_count, media_count, connected_at
            FROM accounts
            WHERE user_id = ?
              AND (username LIKE ? ESCAPE '\' OR display_name LIKE ? ESCAPE '\')
            ORDER BY follower_count DESC, id ASC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SourceError::new(EntityType::Account, e.to_string()))?;

        Ok(rows.into_iter().map(AccountRow::into_candidate).collect())
    }
}

// ========== Trends ==========

/// Adapter over observed trends, ordered by momentum
#[derive(Debug, Clone)]
pub struct TrendAdapter {
    pool: SqlitePool,
}

impl TrendAdapter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TrendRow {
    id: String,
    topic: String,
    description: String,
    momentum: f64,
    first_seen_at: Option<DateTime<Utc>>,
}

impl TrendRow {
    fn into_candidate(self) -> RawCandidate {
        let search_text = format!("{} {}", self.topic, self.description);
        RawCandidate {
            entity_type: EntityType::Trend,
            id: self.id,
            title: self.topic,
            subtitle: format!("momentum {:.1}", self.momentum),
            description: self.description,
            search_text,
            metadata: ResultMetadata::Trend {
                momentum: self.momentum,
                first_seen_at: self.first_seen_at,
            },
        }
    }
}

#[async_trait]
impl SourceAdapter for TrendAdapter {
    fn entity_type(&self) -> EntityType {
        EntityType::Trend
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        _filters: &SearchFilters,
        limit: u32,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        let pattern = like_pattern(query);
        let rows: Vec<TrendRow> = sqlx::query_as(
            r#"
            SELECT id, topic, description, momentum, first_seen_at
            FROM trends
            WHERE user_id = ?
              AND (topic LIKE ? ESCAPE '\' OR description LIKE ? ESCAPE '\')
            ORDER BY momentum DESC, id ASC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SourceError::new(EntityType::Trend, e.to_string()))?;

        Ok(rows.into_iter().map(TrendRow::into_candidate).collect())
    }
}
