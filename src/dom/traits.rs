//! DOM host trait.
//!
//! The controller only needs four elements: the search input, the clear
//! control, the results container and the list inside it. `DomHost` exposes
//! exactly the operations it performs on them.

use crate::dom::node::Node;

/// The page elements the search box drives.
pub trait DomHost {
    /// Current value of the search input.
    fn query(&self) -> String;

    /// Overwrite the search input's value.
    fn set_query(&mut self, value: &str);

    /// Enable the search input. Pages ship it disabled so it stays inert
    /// without scripting.
    fn enable_input(&mut self);

    /// Show or hide the results container.
    fn set_visible(&mut self, visible: bool);

    /// Replace the contents of the results list.
    fn replace_results(&mut self, nodes: Vec<Node>);
}
