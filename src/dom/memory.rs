//! In-memory DOM host.
//!
//! Records everything the controller does to the page so that tests and the
//! CLI can inspect the outcome without a browser.

use crate::dom::node::{self, Node};
use crate::dom::traits::DomHost;

/// DOM host that keeps the page state in plain fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryDom {
    query: String,
    input_enabled: bool,
    visible: bool,
    results: Vec<Node>,
    render_count: usize,
}

impl MemoryDom {
    /// A page with an empty, disabled input and a hidden container.
    pub fn new() -> Self {
        Self::default()
    }

    /// A page whose input already holds `query`.
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Nodes currently in the results list.
    pub fn results(&self) -> &[Node] {
        &self.results
    }

    /// The results list serialized to HTML.
    pub fn results_html(&self) -> String {
        node::to_html(&self.results)
    }

    /// How many times the results list was replaced.
    pub fn render_count(&self) -> usize {
        self.render_count
    }
}

impl DomHost for MemoryDom {
    fn query(&self) -> String {
        self.query.clone()
    }

    fn set_query(&mut self, value: &str) {
        self.query = value.to_string();
    }

    fn enable_input(&mut self) {
        self.input_enabled = true;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn replace_results(&mut self, nodes: Vec<Node>) {
        self.results = nodes;
        self.render_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_page_is_inert() {
        let dom = MemoryDom::new();
        assert!(dom.query().is_empty());
        assert!(!dom.is_visible());
        assert!(!dom.is_input_enabled());
        assert_eq!(dom.render_count(), 0);
    }

    #[test]
    fn test_records_mutations() {
        let mut dom = MemoryDom::with_query("pcre");
        assert_eq!(dom.query(), "pcre");

        dom.enable_input();
        dom.set_visible(true);
        dom.replace_results(vec![Node::text("a < b")]);
        dom.set_query("");

        assert!(dom.is_input_enabled());
        assert!(dom.is_visible());
        assert_eq!(dom.results_html(), "a &lt; b");
        assert_eq!(dom.render_count(), 1);
        assert!(dom.query().is_empty());
    }
}
