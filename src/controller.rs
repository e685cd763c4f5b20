//! Search box controller.
//!
//! Wires the page's input and clear events to a [`SearchIndex`] and renders
//! what comes back into a [`DomHost`].
//!
//! Every handler takes `&self` and no DOM borrow is held across an await, so
//! several `on_input` futures can be in flight on the same event loop. Only
//! the newest one renders: older ones come back from the index as
//! [`SearchOutcome::Superseded`] and are dropped without touching the page.

use std::cell::{Ref, RefCell, RefMut};
use std::time::Duration;

use futures::future::try_join_all;

use crate::config::{Config, RenderConfig};
use crate::dom::DomHost;
use crate::error::Result;
use crate::index::{ResultHandle, SearchIndex, SearchOptions, SearchOutcome, SearchResult};
use crate::render::{self, View, ViewState};

/// What an input event ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The search was current and its results were rendered.
    ///
    /// `count` is how many results were loaded and rendered, `matched` how
    /// many pages the index matched before filters.
    Rendered {
        state: ViewState,
        count: usize,
        matched: usize,
    },
    /// A newer search replaced this one; the page was left alone.
    Superseded,
}

/// Connects a search index to the search box on a page.
pub struct SearchController<I, D> {
    index: I,
    dom: RefCell<D>,
    debounce: Duration,
    max_results: usize,
    options: SearchOptions,
    render: RenderConfig,
}

impl<I, D> SearchController<I, D>
where
    I: SearchIndex,
    D: DomHost,
{
    /// Create a controller over an index and a page.
    pub fn new(index: I, dom: D, config: &Config) -> Self {
        Self {
            index,
            dom: RefCell::new(dom),
            debounce: config.search.debounce(),
            max_results: config.search.max_results,
            options: config.search.options.clone(),
            render: config.render.clone(),
        }
    }

    /// Initialize the index and enable the search input.
    pub fn mount(&self) -> Result<()> {
        self.index.init()?;
        self.dom.borrow_mut().enable_input();
        tracing::debug!("search box mounted");
        Ok(())
    }

    /// Handle an input event on the search box.
    ///
    /// Reads the current query, runs a debounced search and, unless it was
    /// superseded, loads the top hits concurrently and renders them.
    pub async fn on_input(&self) -> Result<InputOutcome> {
        let query = self.dom.borrow().query();
        tracing::debug!(query = %query, "issuing debounced search");

        let outcome = self
            .index
            .debounced_search(&query, &self.options, self.debounce)
            .await?;

        let response = match outcome {
            SearchOutcome::Fresh(response) => response,
            SearchOutcome::Superseded => {
                tracing::trace!(query = %query, "search superseded, discarding");
                return Ok(InputOutcome::Superseded);
            }
        };

        let top = response.results.iter().take(self.max_results);
        let results = try_join_all(top.map(|hit| hit.data())).await?;

        let state = self.render(&results);
        Ok(InputOutcome::Rendered {
            state,
            count: results.len(),
            matched: response.unfiltered_result_count,
        })
    }

    /// Handle a click on the clear control.
    pub fn on_clear(&self) -> ViewState {
        self.dom.borrow_mut().set_query("");
        self.render(&[])
    }

    /// Render `results` against the query currently in the input.
    pub fn render(&self, results: &[SearchResult]) -> ViewState {
        let mut dom = self.dom.borrow_mut();
        let query = dom.query();

        match render::render(&query, results, &self.render) {
            View::Hidden => {
                dom.set_visible(false);
                ViewState::Hidden
            }
            View::Visible(nodes) => {
                dom.set_visible(true);
                dom.replace_results(nodes);
                tracing::debug!(query = %query, count = results.len(), "rendered results");
                ViewState::Visible
            }
        }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn dom(&self) -> Ref<'_, D> {
        self.dom.borrow()
    }

    /// Mutable access to the page, e.g. to simulate typing.
    pub fn dom_mut(&self) -> RefMut<'_, D> {
        self.dom.borrow_mut()
    }
}
