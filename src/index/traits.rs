//! Search index capability traits.
//!
//! The controller never talks to a concrete index. It is handed something
//! implementing [`SearchIndex`] at construction, which in the browser is the
//! Pagefind module and in tests is a [`FixedIndex`](super::FixedIndex).
//!
//! The traits are not `Send`: every implementation lives on a single-threaded
//! event loop, and the browser one holds JavaScript handles.

#![allow(async_fn_in_trait)]

use std::time::Duration;

use crate::error::Result;
use crate::index::types::{SearchOptions, SearchResult};

/// An opaque, already-built search index.
pub trait SearchIndex {
    /// Handle for one hit whose detail payload is loaded on demand.
    type Hit: ResultHandle;

    /// Prepare the index for searching. Called once on mount.
    fn init(&self) -> Result<()>;

    /// Search after `delay` of quiet.
    ///
    /// Resolves to [`SearchOutcome::Superseded`] when another call was issued
    /// while this one was waiting out its debounce window.
    async fn debounced_search(
        &self,
        query: &str,
        options: &SearchOptions,
        delay: Duration,
    ) -> Result<SearchOutcome<Self::Hit>>;
}

/// A single hit returned by [`SearchIndex::debounced_search`].
pub trait ResultHandle {
    /// Load the full detail payload for this hit.
    async fn data(&self) -> Result<SearchResult>;
}

/// Ordered hits for a query, before their payloads are loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse<H> {
    /// Hits, best first.
    pub results: Vec<H>,
    /// Matches before filters were applied.
    pub unfiltered_result_count: usize,
}

impl<H> SearchResponse<H> {
    pub fn new(results: Vec<H>) -> Self {
        let unfiltered_result_count = results.len();
        Self {
            results,
            unfiltered_result_count,
        }
    }
}

/// What a debounced search resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<H> {
    /// This call is the most recent one; its hits should be rendered.
    Fresh(SearchResponse<H>),
    /// A newer call superseded this one; discard without rendering.
    Superseded,
}

impl<H> SearchOutcome<H> {
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }

    /// The response, if this outcome is fresh.
    pub fn fresh(self) -> Option<SearchResponse<H>> {
        match self {
            Self::Fresh(response) => Some(response),
            Self::Superseded => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_counts_results() {
        let response = SearchResponse::new(vec![1, 2, 3]);
        assert_eq!(response.unfiltered_result_count, 3);
    }

    #[test]
    fn test_outcome_accessors() {
        let fresh: SearchOutcome<u8> = SearchOutcome::Fresh(SearchResponse::new(vec![7]));
        assert!(!fresh.is_superseded());
        assert_eq!(fresh.fresh().unwrap().results, vec![7]);

        let stale: SearchOutcome<u8> = SearchOutcome::Superseded;
        assert!(stale.is_superseded());
        assert!(stale.fresh().is_none());
    }
}
