//! Federated search domain
//!
//! Search across every entity type in a workspace: adapters fetch bounded
//! candidate sets per type, the scorer normalizes them onto a shared 0-100
//! scale, and the engine filters, sorts, and summarizes the merged set.

pub mod adapter;
pub mod entity;
pub mod filter;
pub mod history;
pub mod insights;
pub mod repository;
pub mod scoring;
pub mod service;
pub mod sort;

pub use adapter::{SourceAdapter, SourceError};
pub use entity::{
    EntityType, RawCandidate, ResultMetadata, SearchFilters, SearchHistoryEntry, SearchInsights,
    SearchQuery, SearchResponse, SearchResult, SearchScope, SortBy, SortOrder,
};
pub use history::{HistoryRecorder, SqliteHistoryRecorder};
pub use repository::all_adapters;
pub use service::SearchEngine;
