//! Search entity and related types
//!
//! Defines the core types for federated search: queries, filters, results,
//! the per-entity metadata variants, and the response envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Types of entities that can be searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityType {
    /// Tracked hashtags
    Tag,
    /// Saved content items (captioned media)
    Content,
    /// Curated notable accounts being watched
    NotableAccount,
    /// Tracked competitors
    Competitor,
    /// Periodic analytics snapshots
    AnalyticsSnapshot,
    /// Workspace team members
    TeamMember,
    /// Published posts
    Post,
    /// Connected social accounts
    Account,
    /// Observed trends
    Trend,
}

impl EntityType {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Content => "content",
            Self::NotableAccount => "notableAccount",
            Self::Competitor => "competitor",
            Self::AnalyticsSnapshot => "analyticsSnapshot",
            Self::TeamMember => "teamMember",
            Self::Post => "post",
            Self::Account => "account",
            Self::Trend => "trend",
        }
    }

    /// Create from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tag" => Some(Self::Tag),
            "content" => Some(Self::Content),
            "notableAccount" | "notable_account" => Some(Self::NotableAccount),
            "competitor" => Some(Self::Competitor),
            "analyticsSnapshot" | "analytics_snapshot" => Some(Self::AnalyticsSnapshot),
            "teamMember" | "team_member" => Some(Self::TeamMember),
            "post" => Some(Self::Post),
            "account" => Some(Self::Account),
            "trend" => Some(Self::Trend),
            _ => None,
        }
    }

    /// Get all entity types
    pub fn all() -> Vec<Self> {
        vec![
            Self::Tag,
            Self::Content,
            Self::NotableAccount,
            Self::Competitor,
            Self::AnalyticsSnapshot,
            Self::TeamMember,
            Self::Post,
            Self::Account,
            Self::Trend,
        ]
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Search scope: a single entity type or a federated search across all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchScope {
    /// Federated search across every source
    All,
    /// Search a single entity type
    Entity(EntityType),
}

impl SearchScope {
    /// Create from string representation ("all" or an entity type name)
    pub fn parse(s: &str) -> Option<Self> {
        if s == "all" {
            return Some(Self::All);
        }
        EntityType::parse(s).map(Self::Entity)
    }

    /// Whether a result of the given type belongs to this scope
    pub fn contains(&self, entity_type: EntityType) -> bool {
        match self {
            Self::All => true,
            Self::Entity(t) => *t == entity_type,
        }
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Entity(t) => write!(f, "{}", t),
        }
    }
}

/// Sort key for the final result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Relevance,
    Date,
    Alphabetical,
}

impl SortBy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "relevance" => Some(Self::Relevance),
            "date" => Some(Self::Date),
            "alphabetical" => Some(Self::Alphabetical),
            _ => None,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Post-hoc filters applied over the merged result set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    /// Type allow-list; empty means all types pass
    pub types: Vec<EntityType>,

    /// Inclusive lower bound of the date window
    pub date_from: Option<DateTime<Utc>>,

    /// Inclusive upper bound of the date window
    pub date_to: Option<DateTime<Utc>>,

    /// Minimum relevance score in [0, 100]
    pub min_relevance: Option<f64>,

    /// Sort key (default: relevance)
    pub sort_by: SortBy,

    /// Sort direction (default: descending)
    pub sort_order: SortOrder,
}

impl SearchFilters {
    /// Whether a date window was requested
    pub fn has_date_window(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }
}

/// A search query with all parameters, immutable once dispatched
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// The search text (non-empty, trimmed)
    pub text: String,

    /// Search scope (single entity type or federated)
    pub scope: SearchScope,

    /// Post-hoc filters
    pub filters: SearchFilters,

    /// Maximum number of results to return
    pub result_limit: u32,
}

impl SearchQuery {
    /// Default result limit when a request does not specify one
    pub const DEFAULT_LIMIT: u32 = 50;

    /// Create a new federated search query with default settings
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            scope: SearchScope::All,
            filters: SearchFilters::default(),
            result_limit: Self::DEFAULT_LIMIT,
        }
    }

    /// Set the search scope
    pub fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the filters
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Set the result limit
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.result_limit = limit;
        self
    }

    /// Set the sort key
    pub fn with_sort(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.filters.sort_by = sort_by;
        self.filters.sort_order = sort_order;
        self
    }
}

/// Type-specific metadata carried opaquely on each result
///
/// The engine only reads the optional timestamp for date filtering and
/// date sorting; callers interpret the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ResultMetadata {
    Tag {
        category: String,
        usage_count: i64,
        last_used_at: Option<DateTime<Utc>>,
    },
    Content {
        media_type: String,
        like_count: i64,
        comment_count: i64,
        posted_at: Option<DateTime<Utc>>,
    },
    NotableAccount {
        niche: String,
        follower_count: i64,
        engagement_rate: f64,
        noted_at: Option<DateTime<Utc>>,
    },
    Competitor {
        handle: String,
        follower_count: i64,
        tracked_since: Option<DateTime<Utc>>,
    },
    AnalyticsSnapshot {
        follower_delta: i64,
        engagement_rate: f64,
        captured_at: Option<DateTime<Utc>>,
    },
    TeamMember {
        role: String,
        email: String,
        joined_at: Option<DateTime<Utc>>,
    },
    Post {
        hashtags: String,
        like_count: i64,
        posted_at: Option<DateTime<Utc>>,
    },
    Account {
        platform: String,
        follower_count: i64,
        media_count: i64,
        connected_at: Option<DateTime<Utc>>,
    },
    Trend {
        momentum: f64,
        first_seen_at: Option<DateTime<Utc>>,
    },
}

impl ResultMetadata {
    /// The timestamp used for date filtering and date sorting, if any
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Tag { last_used_at, .. } => *last_used_at,
            Self::Content { posted_at, .. } => *posted_at,
            Self::NotableAccount { noted_at, .. } => *noted_at,
            Self::Competitor { tracked_since, .. } => *tracked_since,
            Self::AnalyticsSnapshot { captured_at, .. } => *captured_at,
            Self::TeamMember { joined_at, .. } => *joined_at,
            Self::Post { posted_at, .. } => *posted_at,
            Self::Account { connected_at, .. } => *connected_at,
            Self::Trend { first_seen_at, .. } => *first_seen_at,
        }
    }
}

/// A raw candidate record produced by a source adapter, before scoring
#[derive(Debug, Clone)]
pub struct RawCandidate {
    /// Entity type of the source that produced this candidate
    pub entity_type: EntityType,
    /// Unique identifier within the source
    pub id: String,
    /// Display title
    pub title: String,
    /// Display subtitle
    pub subtitle: String,
    /// Longer description
    pub description: String,
    /// The designated text the relevance scorer runs against
    pub search_text: String,
    /// Type-specific metadata
    pub metadata: ResultMetadata,
}

/// A single search result, immutable once normalized
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Type of entity that matched
    #[serde(rename = "type")]
    pub entity_type: EntityType,

    /// Unique identifier of the matched entity
    pub id: String,

    /// Title of the matched entity
    pub title: String,

    /// Subtitle for display
    pub subtitle: String,

    /// Longer description
    pub description: String,

    /// Type-specific metadata, opaque to the engine
    pub metadata: ResultMetadata,

    /// Relevance score in [0, 100], fixed at creation
    pub relevance_score: f64,
}

impl SearchResult {
    /// The timestamp used for date filtering/sorting, derived from metadata
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.metadata.timestamp()
    }
}

/// Derived summary statistics and suggestions for a result set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInsights {
    /// Number of results per entity type
    pub result_count_by_type: HashMap<EntityType, u32>,

    /// Highest relevance score in the set (0 if empty)
    pub top_relevance: f64,

    /// Mean relevance score over the set (0 if empty)
    pub average_relevance: f64,

    /// Suggested follow-up terms, first-seen order, at most 5
    pub suggested_terms: Vec<String>,

    /// Scope-templated related queries, at most 3
    pub related_queries: Vec<String>,
}

/// The response envelope returned by the dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Final ordered results
    pub results: Vec<SearchResult>,

    /// Count of merged results before filtering
    pub total_count: u32,

    /// Count after the filter pipeline
    pub filtered_count: u32,

    /// Derived insights over the final set
    pub insights: SearchInsights,

    /// When the response was produced
    pub generated_at: DateTime<Utc>,

    /// Real elapsed wall-clock time for the dispatch
    pub execution_time_ms: u64,
}

/// Append-only audit record of an executed search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    /// Unique entry ID
    pub id: Uuid,

    /// The user who ran the search
    pub user_id: String,

    /// The query text
    pub query: String,

    /// Snapshot of the filters at dispatch time
    pub filters: SearchFilters,

    /// Result count, filled in once the search settles
    pub result_count: Option<u32>,

    /// When the search was executed
    pub executed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_conversion() {
        assert_eq!(EntityType::Tag.as_str(), "tag");
        assert_eq!(EntityType::NotableAccount.as_str(), "notableAccount");
        assert_eq!(EntityType::parse("tag"), Some(EntityType::Tag));
        assert_eq!(
            EntityType::parse("analyticsSnapshot"),
            Some(EntityType::AnalyticsSnapshot)
        );
        assert_eq!(EntityType::parse("invalid"), None);
        assert_eq!(EntityType::all().len(), 9);
    }

    #[test]
    fn test_scope_parse_and_contains() {
        assert_eq!(SearchScope::parse("all"), Some(SearchScope::All));
        assert_eq!(
            SearchScope::parse("trend"),
            Some(SearchScope::Entity(EntityType::Trend))
        );
        assert_eq!(SearchScope::parse("everything"), None);

        assert!(SearchScope::All.contains(EntityType::Post));
        assert!(SearchScope::Entity(EntityType::Tag).contains(EntityType::Tag));
        assert!(!SearchScope::Entity(EntityType::Tag).contains(EntityType::Post));
    }

    #[test]
    fn test_search_query_builder() {
        let query = SearchQuery::new("  growth tips  ")
            .with_scope(SearchScope::Entity(EntityType::Post))
            .with_limit(10)
            .with_sort(SortBy::Date, SortOrder::Asc);

        assert_eq!(query.text, "growth tips");
        assert_eq!(query.scope, SearchScope::Entity(EntityType::Post));
        assert_eq!(query.result_limit, 10);
        assert_eq!(query.filters.sort_by, SortBy::Date);
        assert_eq!(query.filters.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_filters_defaults() {
        let filters = SearchFilters::default();
        assert!(filters.types.is_empty());
        assert!(filters.min_relevance.is_none());
        assert!(!filters.has_date_window());
        assert_eq!(filters.sort_by, SortBy::Relevance);
        assert_eq!(filters.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_metadata_timestamp() {
        let ts = Utc::now();
        let meta = ResultMetadata::Post {
            hashtags: "#growth".into(),
            like_count: 12,
            posted_at: Some(ts),
        };
        assert_eq!(meta.timestamp(), Some(ts));

        let meta = ResultMetadata::TeamMember {
            role: "editor".into(),
            email: "e@example.com".into(),
            joined_at: None,
        };
        assert_eq!(meta.timestamp(), None);
    }

    #[test]
    fn test_entity_type_serde_names() {
        let json = serde_json::to_string(&EntityType::NotableAccount).unwrap();
        assert_eq!(json, "\"notableAccount\"");
        let back: EntityType = serde_json::from_str("\"teamMember\"").unwrap();
        assert_eq!(back, EntityType::TeamMember);
    }

    #[test]
    fn test_search_result_serde_envelope() {
        let result = SearchResult {
            entity_type: EntityType::Tag,
            id: "t1".into(),
            title: "growthhacks".into(),
            subtitle: "marketing".into(),
            description: String::new(),
            metadata: ResultMetadata::Tag {
                category: "marketing".into(),
                usage_count: 3,
                last_used_at: None,
            },
            relevance_score: 88.0,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "tag");
        assert_eq!(value["relevanceScore"], 88.0);
        assert_eq!(value["metadata"]["kind"], "tag");
    }
}
