//! Request and response envelopes
//!
//! The wire-facing layer: an incoming request deserializes into
//! [`SearchRequest`], converts into a validated [`SearchQuery`], and either
//! the [`SearchResponse`](crate::domain::search::SearchResponse) or an
//! [`ErrorEnvelope`] goes back out. All JSON field names are camelCase.

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::domain::search::{SearchFilters, SearchQuery, SearchScope};
use crate::error::{Error, Result};

/// An incoming search request, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    /// The search text
    pub query: String,

    /// Scope name: "all" or an entity type name; absent means "all"
    pub scope: Option<String>,

    /// Optional filters
    pub filters: Option<SearchFilters>,

    /// Optional result limit; absent means the configured default
    pub result_limit: Option<u32>,
}

impl SearchRequest {
    /// Convert into a dispatchable query, resolving defaults from config
    ///
    /// An unrecognized scope name is rejected here; text and limit bounds
    /// are validated by the engine at dispatch time.
    pub fn into_query(self, config: &SearchConfig) -> Result<SearchQuery> {
        let scope = match self.scope {
            None => SearchScope::All,
            Some(s) => SearchScope::parse(&s).ok_or(Error::InvalidScope(s))?,
        };

        Ok(SearchQuery::new(self.query)
            .with_scope(scope)
            .with_filters(self.filters.unwrap_or_default())
            .with_limit(self.result_limit.unwrap_or(config.default_limit)))
    }
}

/// The error envelope returned for any failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

/// Stable machine code plus human-readable message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn from_error(err: &Error) -> Self {
        Self {
            error: ErrorBody {
                code: err.code().to_string(),
                message: err.to_string(),
            },
        }
    }
}

impl From<&Error> for ErrorEnvelope {
    fn from(err: &Error) -> Self {
        Self::from_error(err)
    }
}
