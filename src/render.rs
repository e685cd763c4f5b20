//! Rendering of search results into a node tree.
//!
//! [`render`] is a pure function of the current query and the resolved
//! results. The produced markup matches what the page stylesheet expects:
//!
//! ```text
//! <div class="search-count">Search results:</div>
//! <ul>
//!   <li><a href="/page"><span>Title</span></a><div class="search-excerpt">…excerpt…</div></li>
//!   <li><a href="/other"><span>Other</span></a>
//!     <ul><li><a href="/other.html#sec"><span>Section</span></a><div class="search-excerpt">…</div></li></ul>
//!   </li>
//! </ul>
//! ```
//!
//! Titles are always text. Excerpts follow [`ExcerptPolicy`], and so do link
//! targets: unless the policy is `trusted`, only relative and `http(s)` URLs
//! are linked.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use html_escape::decode_html_entities;
use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::dom::{Element, Node};
use crate::error::SiteSearchError;
use crate::index::{SearchResult, SubResult};

const ELLIPSIS: &str = "\u{2026}";

/// Link target used in place of a URL whose scheme is not allowed.
const BLOCKED_HREF: &str = "#";

/// Visibility of the results container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Hidden,
    Visible,
}

/// Rendered output for one result set.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Hide the container and leave its contents alone.
    Hidden,
    /// Show the container with these nodes as the list contents.
    Visible(Vec<Node>),
}

impl View {
    pub fn state(&self) -> ViewState {
        match self {
            View::Hidden => ViewState::Hidden,
            View::Visible(_) => ViewState::Visible,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        match self {
            View::Hidden => &[],
            View::Visible(nodes) => nodes,
        }
    }
}

/// How excerpt markup supplied by the index is inserted.
///
/// Excerpts come from the index builder as HTML fragments with `<mark>`
/// around matched words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExcerptPolicy {
    /// Insert the excerpt markup as-is.
    Trusted,
    /// Keep `<mark>` highlighting; any other markup is shown as text.
    #[default]
    MarkOnly,
    /// Drop all tags and show only the text.
    PlainText,
}

/// Valid values for the excerpt policy.
pub const VALID_EXCERPT_POLICIES: &[&str] = &["trusted", "mark-only", "plain-text"];

impl ExcerptPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExcerptPolicy::Trusted => "trusted",
            ExcerptPolicy::MarkOnly => "mark-only",
            ExcerptPolicy::PlainText => "plain-text",
        }
    }
}

impl fmt::Display for ExcerptPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExcerptPolicy {
    type Err = SiteSearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trusted" => Ok(ExcerptPolicy::Trusted),
            "mark-only" => Ok(ExcerptPolicy::MarkOnly),
            "plain-text" => Ok(ExcerptPolicy::PlainText),
            other => Err(SiteSearchError::config(format!(
                "invalid excerpt policy '{}', valid values: {:?}",
                other, VALID_EXCERPT_POLICIES
            ))),
        }
    }
}

/// Render `results` for `query`.
///
/// An empty query always hides the container, whatever `results` holds.
pub fn render(query: &str, results: &[SearchResult], config: &RenderConfig) -> View {
    if query.is_empty() {
        return View::Hidden;
    }

    if results.is_empty() {
        return View::Visible(vec![search_count(&config.no_results_message)]);
    }

    let items = results
        .iter()
        .map(|result| result_item(result, config.excerpt_policy));
    View::Visible(vec![
        search_count(&config.results_heading),
        Element::new("ul").children(items).into(),
    ])
}

fn search_count(message: &str) -> Node {
    Element::new("div")
        .attr("class", "search-count")
        .child(Node::text(message))
        .into()
}

fn result_item(result: &SearchResult, policy: ExcerptPolicy) -> Node {
    let item = Element::new("li").child(title_link(&result.url, result.title(), policy));

    if !result.has_sub_results() {
        return item.child(excerpt(&result.excerpt, policy)).into();
    }

    let subs = result
        .sub_results
        .iter()
        .map(|sub| sub_result_item(sub, policy));
    item.child(Element::new("ul").children(subs)).into()
}

fn sub_result_item(sub: &SubResult, policy: ExcerptPolicy) -> Node {
    Element::new("li")
        .child(title_link(&sub.url, &sub.title, policy))
        .child(excerpt(&sub.excerpt, policy))
        .into()
}

fn title_link(url: &str, title: &str, policy: ExcerptPolicy) -> Node {
    Element::new("a")
        .attr("href", link_target(url, policy))
        .child(Element::new("span").child(Node::text(title)))
        .into()
}

fn excerpt(excerpt: &str, policy: ExcerptPolicy) -> Node {
    Element::new("div")
        .attr("class", "search-excerpt")
        .child(Node::text(ELLIPSIS))
        .children(excerpt_nodes(excerpt, policy))
        .child(Node::text(ELLIPSIS))
        .into()
}

/// The href for a result URL: `.html` stripped, unsafe schemes blocked.
pub fn link_target(url: &str, policy: ExcerptPolicy) -> Cow<'_, str> {
    if policy != ExcerptPolicy::Trusted && !is_linkable(url) {
        tracing::warn!(url, "refusing to link result URL");
        return Cow::Borrowed(BLOCKED_HREF);
    }
    strip_html_extension(url)
}

/// Relative URLs and absolute `http`/`https` ones.
fn is_linkable(url: &str) -> bool {
    // Browsers ignore leading blanks and embedded tabs/newlines in a scheme.
    let cleaned: String = url
        .trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();

    let scheme_end = match cleaned.find([':', '/', '?', '#']) {
        Some(pos) if cleaned[pos..].starts_with(':') => pos,
        _ => return true,
    };
    let scheme = &cleaned[..scheme_end];
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}

/// Drop a trailing `.html` from `url`, keeping any query string.
///
/// Only the part before the first `?` is looked at, so
/// `/doc/page.html?x=1` becomes `/doc/page?x=1` while
/// `/doc/page.html#sec` is left alone.
pub fn strip_html_extension(url: &str) -> Cow<'_, str> {
    let path_end = url.find('?').unwrap_or(url.len());
    let (path, rest) = url.split_at(path_end);
    match path.strip_suffix(".html") {
        Some(stem) => Cow::Owned(format!("{}{}", stem, rest)),
        None => Cow::Borrowed(url),
    }
}

/// Turn an excerpt fragment into nodes according to `policy`.
pub fn excerpt_nodes(excerpt: &str, policy: ExcerptPolicy) -> Vec<Node> {
    match policy {
        ExcerptPolicy::Trusted => vec![Node::html(excerpt)],
        ExcerptPolicy::MarkOnly => mark_only_nodes(excerpt),
        ExcerptPolicy::PlainText => {
            vec![Node::text(decode_html_entities(&strip_tags(excerpt)).into_owned())]
        }
    }
}

/// Keep `<mark>`/`</mark>` as elements, everything else becomes text.
fn mark_only_nodes(excerpt: &str) -> Vec<Node> {
    // Innermost open frame last; frame 0 is the top level.
    let mut frames: Vec<Vec<Node>> = vec![Vec::new()];
    let mut text = String::new();
    let mut rest = excerpt;

    fn flush(text: &mut String, frames: &mut [Vec<Node>]) {
        if !text.is_empty() {
            if let Some(frame) = frames.last_mut() {
                frame.push(Node::text(decode_html_entities(text.as_str()).into_owned()));
            }
            text.clear();
        }
    }

    while let Some(pos) = rest.find('<') {
        text.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = strip_prefix_ignore_case(tail, "<mark>") {
            flush(&mut text, &mut frames);
            frames.push(Vec::new());
            rest = after;
        } else if let (Some(after), true) =
            (strip_prefix_ignore_case(tail, "</mark>"), frames.len() > 1)
        {
            flush(&mut text, &mut frames);
            close_mark(&mut frames);
            rest = after;
        } else {
            text.push('<');
            rest = &tail[1..];
        }
    }
    text.push_str(rest);
    flush(&mut text, &mut frames);

    while frames.len() > 1 {
        close_mark(&mut frames);
    }
    frames.pop().unwrap_or_default()
}

fn close_mark(frames: &mut Vec<Vec<Node>>) {
    if let Some(children) = frames.pop() {
        let mark = Element::new("mark").children(children);
        if let Some(parent) = frames.last_mut() {
            parent.push(mark.into());
        }
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Remove everything between `<` and the next `>`.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
