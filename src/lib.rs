//! sitesearch - search box controller for static-site search indexes
//!
//! Connects a page's search box to a pre-built search index (such as
//! Pagefind) and renders results, with sub-results, into a results container.
//! Ranking and matching stay in the index; this crate owns the
//! debounce-and-render glue: forward each keystroke as a debounced search,
//! drop superseded searches, load the top hits and render them.
//!
//! The index and the page are injected ([`SearchIndex`], [`DomHost`]), so the
//! same controller runs in the browser (feature `web`) and against in-memory
//! doubles ([`FixedIndex`], [`MemoryDom`]).

pub mod cli;
pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod index;
pub mod render;
#[cfg(feature = "web")]
pub mod web;

pub use config::Config;
pub use controller::{InputOutcome, SearchController};
pub use dom::{DomHost, Element, MemoryDom, Node};
pub use error::{Result, SiteSearchError};
pub use index::{
    FixedIndex, ResultHandle, SearchIndex, SearchOptions, SearchOutcome, SearchResponse,
    SearchResult, SubResult,
};
pub use render::{render, ExcerptPolicy, View, ViewState};

// CLI commands
pub use cli::{ConfigCommand, RenderCommand};
