//! Result payloads produced by the search index.
//!
//! These mirror the JSON a Pagefind `result.data()` call resolves to. Only
//! `url`, `meta.title`, `excerpt` and `sub_results` are rendered; the rest is
//! carried so hosts can inspect it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fully loaded detail payload for one matching page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchResult {
    /// Page URL as written by the index builder (usually ending in `.html`).
    pub url: String,
    /// URL before any rewriting by the index builder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_url: Option<String>,
    /// Page metadata; `title` is always present, other keys vary per site.
    pub meta: ResultMeta,
    /// Highlighted snippet. An HTML fragment with `<mark>` around hits.
    pub excerpt: String,
    /// Full plain-text content of the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
    /// Filter values attached to the page.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, Vec<String>>,
    /// Finer-grained matches within the page, in document order.
    pub sub_results: Vec<SubResult>,
}

impl SearchResult {
    /// Create a result with a URL, title and excerpt and no sub-results.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        excerpt: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            meta: ResultMeta::titled(title),
            excerpt: excerpt.into(),
            ..Default::default()
        }
    }

    /// Builder: append a sub-result.
    pub fn with_sub_result(mut self, sub: SubResult) -> Self {
        self.sub_results.push(sub);
        self
    }

    /// The page title.
    pub fn title(&self) -> &str {
        &self.meta.title
    }

    /// Whether the page has sub-results to render instead of its own excerpt.
    pub fn has_sub_results(&self) -> bool {
        !self.sub_results.is_empty()
    }
}

/// Page metadata extracted by the index builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResultMeta {
    #[serde(default)]
    pub title: String,
    /// Any other metadata (image, author, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ResultMeta {
    /// Metadata with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// A match inside a page, usually anchored at a heading.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SubResult {
    pub url: String,
    pub title: String,
    pub excerpt: String,
}

impl SubResult {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        excerpt: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            excerpt: excerpt.into(),
        }
    }
}

/// Options forwarded verbatim to the index with every search.
///
/// Empty by default, which is what the search box sends.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchOptions {
    /// Filter name to accepted values.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, Vec<String>>,
    /// Sort key to direction (`asc` or `desc`).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sort: BTreeMap<String, String>,
}

impl SearchOptions {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.sort.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_pagefind_payload() {
        let json = r#"{
            "url": "/doc/html/pcre2pattern.html",
            "raw_url": "/doc/html/pcre2pattern.html",
            "content": "PCRE2 regular expression details",
            "word_count": 4,
            "filters": {},
            "meta": { "title": "pcre2pattern specification", "image": "/logo.png" },
            "anchors": [],
            "weighted_locations": [],
            "locations": [1, 2],
            "excerpt": "regular <mark>expression</mark> details",
            "sub_results": [
                {
                    "title": "Backslash",
                    "url": "/doc/html/pcre2pattern.html#SEC5",
                    "excerpt": "the <mark>backslash</mark> character",
                    "anchor": { "element": "h2", "id": "SEC5" },
                    "locations": [7]
                }
            ]
        }"#;

        let result: SearchResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.url, "/doc/html/pcre2pattern.html");
        assert_eq!(result.title(), "pcre2pattern specification");
        assert_eq!(result.meta.extra.get("image").unwrap(), "/logo.png");
        assert_eq!(result.word_count, Some(4));
        assert!(result.has_sub_results());
        assert_eq!(result.sub_results[0].title, "Backslash");
        assert_eq!(result.sub_results[0].url, "/doc/html/pcre2pattern.html#SEC5");
    }

    #[test]
    fn test_deserialize_minimal_payload() {
        let result: SearchResult =
            serde_json::from_str(r#"{ "url": "/a.html", "meta": { "title": "A" } }"#).unwrap();
        assert_eq!(result.title(), "A");
        assert!(result.excerpt.is_empty());
        assert!(!result.has_sub_results());
    }

    #[test]
    fn test_empty_options_serialize_to_empty_object() {
        let json = serde_json::to_string(&SearchOptions::default()).unwrap();
        assert_eq!(json, "{}");
        assert!(SearchOptions::default().is_empty());
    }

    #[test]
    fn test_builder() {
        let result = SearchResult::new("/a.html", "A", "alpha")
            .with_sub_result(SubResult::new("/a.html#one", "One", "first"));
        assert_eq!(result.sub_results.len(), 1);
        assert_eq!(result.meta, ResultMeta::titled("A"));
    }
}
