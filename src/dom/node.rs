//! Minimal node tree for the results list.
//!
//! Rendering produces `Node`s instead of HTML strings so that titles and
//! excerpts can never be spliced into markup by accident. Hosts either
//! serialize the tree ([`Node::to_html`]) or build real DOM nodes from it.

use std::fmt::{self, Write};

use v_htmlescape::escape;

/// A node in the rendered results tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Text content; escaped on serialization.
    Text(String),
    /// Markup inserted verbatim. Only produced for trusted excerpts.
    Html(String),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self::Html(html.into())
    }

    /// Serialize this node and its children to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_html(&mut out);
        out
    }

    /// Serialize into any `fmt::Write` sink.
    pub fn write_html<W: Write>(&self, out: &mut W) -> fmt::Result {
        match self {
            Node::Element(element) => element.write_html(out),
            Node::Text(text) => write!(out, "{}", escape(text)),
            Node::Html(html) => out.write_str(html),
        }
    }

    /// Concatenated text of this node, the way `textContent` reads it.
    ///
    /// Verbatim markup is included as-is.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
            Node::Text(text) | Node::Html(text) => out.push_str(text),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// An element with attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: &'static str,
    /// Attributes in insertion order.
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    /// Builder: append a child.
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder: append several children.
    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements with the given tag, in order.
    pub fn child_elements<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter_map(Node::as_element)
            .filter(move |element| element.tag == tag)
    }

    fn write_html<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "<{}", self.tag)?;
        for (name, value) in &self.attrs {
            write!(out, " {}=\"{}\"", name, escape(value))?;
        }
        out.write_char('>')?;
        for child in &self.children {
            child.write_html(out)?;
        }
        write!(out, "</{}>", self.tag)
    }
}

/// Serialize a sequence of sibling nodes.
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        let _ = node.write_html(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_serialization() {
        let node: Node = Element::new("a")
            .attr("href", "/docs/rust")
            .child(Element::new("span").child(Node::text("Rust Guide")))
            .into();
        assert_eq!(
            node.to_html(),
            format!(
                r#"<a href="{}"><span>Rust Guide</span></a>"#,
                escape("/docs/rust")
            )
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let node = Node::text("a < b && c > d");
        assert_eq!(node.to_html(), "a &lt; b &amp;&amp; c &gt; d");
    }

    #[test]
    fn test_attribute_quotes_are_escaped() {
        let node: Node = Element::new("a").attr("href", r#"x" onclick="y"#).into();
        assert_eq!(node.to_html(), r#"<a href="x&quot; onclick=&quot;y"></a>"#);
    }

    #[test]
    fn test_markup_in_text_never_opens_a_tag() {
        let node = Node::text("</span><script>x()</script>");
        let html = node.to_html();
        assert!(!html.contains('<'));
        assert!(!html.contains('>'));
    }

    #[test]
    fn test_html_is_verbatim() {
        let node = Node::html("a <mark>b</mark>");
        assert_eq!(node.to_html(), "a <mark>b</mark>");
    }

    #[test]
    fn test_text_content() {
        let node: Node = Element::new("div")
            .child(Node::text("one "))
            .child(Element::new("mark").child(Node::text("two")))
            .into();
        assert_eq!(node.text_content(), "one two");
    }

    #[test]
    fn test_child_elements() {
        let ul = Element::new("ul")
            .child(Element::new("li"))
            .child(Node::text("gap"))
            .child(Element::new("li"));
        assert_eq!(ul.child_elements("li").count(), 2);
        assert!(ul.get_attr("class").is_none());
    }

    #[test]
    fn test_sibling_serialization() {
        let nodes = vec![Node::text("a"), Element::new("br").into()];
        assert_eq!(to_html(&nodes), "a<br></br>");
    }
}
