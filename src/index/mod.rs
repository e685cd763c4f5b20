//! Search index capability.
//!
//! This module defines what the controller needs from a search index and
//! ships an in-memory implementation. The browser implementation lives in
//! [`crate::web`].

pub mod fixed;
pub mod traits;
pub mod types;

pub use fixed::{FixedHit, FixedIndex, RecordedSearch};
pub use traits::{ResultHandle, SearchIndex, SearchOutcome, SearchResponse};
pub use types::{ResultMeta, SearchOptions, SearchResult, SubResult};
