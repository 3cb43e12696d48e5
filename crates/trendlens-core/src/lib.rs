//! TrendLens Core Library
//!
//! This crate provides the core functionality for TrendLens, including:
//! - Federated search across social analytics entities
//! - Relevance scoring (substring position + token overlap)
//! - Post-hoc filtering, deterministic sorting, and derived insights
//! - Append-only search history recording
//! - Storage (SQLite with auto-migrations)

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::search::{
        EntityType, SearchEngine, SearchFilters, SearchQuery, SearchResponse, SearchResult,
        SearchScope, SortBy, SortOrder,
    };
    pub use crate::error::{Error, Result};
}
