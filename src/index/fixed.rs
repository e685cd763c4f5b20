//! In-memory search index with recorded result sets.
//!
//! `FixedIndex` answers every query from result sets handed to it up front,
//! so it does no matching of its own. It is what the CLI renders from and
//! what the controller tests drive.
//!
//! Staleness follows Pagefind's debounced search: every call bumps a
//! generation counter, waits out its debounce window, and resolves
//! `Superseded` if the counter moved in the meantime. With
//! [`FixedIndex::with_manual_debounce`] the window only ends when
//! [`FixedIndex::release`] is called, which lets tests interleave keystrokes.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;

use crate::error::{Result, SiteSearchError};
use crate::index::traits::{ResultHandle, SearchIndex, SearchOutcome, SearchResponse};
use crate::index::types::{SearchOptions, SearchResult};

/// A search call as the index received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSearch {
    pub query: String,
    pub options: SearchOptions,
    pub delay: Duration,
}

/// Search index backed by fixed, pre-resolved results.
#[derive(Debug, Default)]
pub struct FixedIndex {
    /// Results for queries without a dedicated entry.
    default_results: Vec<SearchResult>,
    /// Results for specific queries.
    by_query: HashMap<String, Vec<SearchResult>>,
    manual_debounce: bool,
    fail_loads: bool,
    generation: Cell<u64>,
    /// Debounce windows waiting for `release()`.
    pending: RefCell<Vec<oneshot::Sender<()>>>,
    calls: RefCell<Vec<RecordedSearch>>,
    inits: Cell<usize>,
    loads: Rc<Cell<usize>>,
}

impl FixedIndex {
    /// Create an index answering every query with `results`.
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self {
            default_results: results,
            ..Default::default()
        }
    }

    /// Parse a JSON array of result payloads.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let results: Vec<SearchResult> = serde_json::from_str(json)?;
        Ok(Self::new(results))
    }

    /// Read a JSON array of result payloads from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SiteSearchError::storage(path, e))?;
        Self::from_json_str(&content)
    }

    /// Builder: answer `query` with `results` instead of the default set.
    pub fn with_query(mut self, query: impl Into<String>, results: Vec<SearchResult>) -> Self {
        self.by_query.insert(query.into(), results);
        self
    }

    /// Builder: hold every debounce window open until [`release`](Self::release).
    pub fn with_manual_debounce(mut self) -> Self {
        self.manual_debounce = true;
        self
    }

    /// Builder: make every `data()` call fail.
    pub fn with_failing_loads(mut self) -> Self {
        self.fail_loads = true;
        self
    }

    /// End every open debounce window. Returns how many were waiting.
    pub fn release(&self) -> usize {
        let pending: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        let count = pending.len();
        for tx in pending {
            // The receiving search may already be dropped.
            let _ = tx.send(());
        }
        count
    }

    /// Number of searches currently waiting out their debounce window.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Every search call received so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedSearch> {
        self.calls.borrow().clone()
    }

    /// Number of times `init` was called.
    pub fn init_count(&self) -> usize {
        self.inits.get()
    }

    /// Number of detail payloads loaded through `data()`.
    pub fn load_count(&self) -> usize {
        self.loads.get()
    }

    fn results_for(&self, query: &str) -> &[SearchResult] {
        self.by_query
            .get(query)
            .map(Vec::as_slice)
            .unwrap_or(self.default_results.as_slice())
    }
}

impl SearchIndex for FixedIndex {
    type Hit = FixedHit;

    fn init(&self) -> Result<()> {
        self.inits.set(self.inits.get() + 1);
        Ok(())
    }

    async fn debounced_search(
        &self,
        query: &str,
        options: &SearchOptions,
        delay: Duration,
    ) -> Result<SearchOutcome<FixedHit>> {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.calls.borrow_mut().push(RecordedSearch {
            query: query.to_string(),
            options: options.clone(),
            delay,
        });

        if self.manual_debounce {
            let (tx, rx) = oneshot::channel();
            self.pending.borrow_mut().push(tx);
            // A dropped sender ends the window just like a release.
            let _ = rx.await;
        }

        if self.generation.get() != generation {
            tracing::trace!(query, "fixed index search superseded");
            return Ok(SearchOutcome::Superseded);
        }

        let hits = self
            .results_for(query)
            .iter()
            .cloned()
            .map(|result| FixedHit {
                result,
                loads: Rc::clone(&self.loads),
                fail: self.fail_loads,
            })
            .collect();
        Ok(SearchOutcome::Fresh(SearchResponse::new(hits)))
    }
}

/// Hit handed out by [`FixedIndex`].
#[derive(Debug, Clone)]
pub struct FixedHit {
    result: SearchResult,
    loads: Rc<Cell<usize>>,
    fail: bool,
}

impl ResultHandle for FixedHit {
    async fn data(&self) -> Result<SearchResult> {
        if self.fail {
            return Err(SiteSearchError::index(format!(
                "failed to load fragment for {}",
                self.result.url
            )));
        }
        self.loads.set(self.loads.get() + 1);
        Ok(self.result.clone())
    }
}
