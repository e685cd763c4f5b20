//! Render command for sitesearch.
//!
//! Drives the search box controller against recorded results and an
//! in-memory page, then prints what the results list would contain.

use futures::executor::block_on;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::controller::{InputOutcome, SearchController};
use crate::dom::MemoryDom;
use crate::index::FixedIndex;
use crate::render::ViewState;

/// Options for the render command.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the render command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderOutput {
    /// Whether rendering succeeded.
    pub success: bool,
    /// The query typed into the box.
    pub query: String,
    /// Whether the results container is shown.
    pub visible: bool,
    /// Number of results rendered.
    pub count: usize,
    /// Pages the index matched before filters.
    pub matched: usize,
    /// The results list markup.
    pub html: String,
    /// Error message if rendering failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RenderOutput {
    /// Create a failed output.
    pub fn failure(query: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            query: query.into(),
            visible: false,
            count: 0,
            matched: 0,
            html: String::new(),
            error: Some(error.into()),
        }
    }
}

/// The render command implementation.
pub struct RenderCommand {
    index: FixedIndex,
    config: Config,
}

impl RenderCommand {
    /// Create a new render command over recorded results.
    pub fn new(index: FixedIndex, config: Config) -> Self {
        Self { index, config }
    }

    /// Type `query` into a fresh page and render what the index returns.
    pub fn run(self, query: &str) -> RenderOutput {
        let controller =
            SearchController::new(self.index, MemoryDom::with_query(query), &self.config);
        if let Err(e) = controller.mount() {
            return RenderOutput::failure(query, e.to_string());
        }

        let outcome = block_on(controller.on_input());
        match outcome {
            Ok(InputOutcome::Rendered {
                state,
                count,
                matched,
            }) => {
                let dom = controller.dom();
                let visible = state == ViewState::Visible;
                RenderOutput {
                    success: true,
                    query: query.to_string(),
                    visible,
                    count,
                    matched,
                    html: if visible {
                        dom.results_html()
                    } else {
                        String::new()
                    },
                    error: None,
                }
            }
            // Nothing else is searching, so this would be an index bug.
            Ok(InputOutcome::Superseded) => {
                RenderOutput::failure(query, "search was unexpectedly superseded")
            }
            Err(e) => RenderOutput::failure(query, e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(output: &RenderOutput, options: &RenderOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            Self::format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(output: &RenderOutput) -> String {
        if !output.success {
            return format!(
                "Render failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if !output.visible {
            return "Results hidden (empty query)\n".to_string();
        }

        format!("{}\n", output.html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SearchResult;

    fn index() -> FixedIndex {
        FixedIndex::new(vec![SearchResult::new(
            "/docs/rust.html",
            "Rust Guide",
            "intro",
        )])
    }

    #[test]
    fn test_run_renders_results() {
        let output = RenderCommand::new(index(), Config::default()).run("rust");

        assert!(output.success);
        assert!(output.visible);
        assert_eq!(output.count, 1);
        assert_eq!(output.matched, 1);
        assert!(output.html.contains("<span>Rust Guide</span></a>"));
        assert!(output.html.contains(&format!("href=\"{}\"", v_htmlescape::escape("/docs/rust"))));
    }

    #[test]
    fn test_run_reports_matched_beyond_rendered() {
        let results = (0..7)
            .map(|i| SearchResult::new(format!("/p/{}.html", i), format!("Page {}", i), ""))
            .collect();
        let output = RenderCommand::new(FixedIndex::new(results), Config::default()).run("page");

        assert_eq!(output.count, 5);
        assert_eq!(output.matched, 7);
    }

    #[test]
    fn test_run_with_empty_query() {
        let output = RenderCommand::new(index(), Config::default()).run("");

        assert!(output.success);
        assert!(!output.visible);
        assert!(output.html.is_empty());
        assert_eq!(
            RenderCommand::format_output(&output, &RenderOptions::default()),
            "Results hidden (empty query)\n"
        );
    }

    #[test]
    fn test_run_reports_load_failure() {
        let output =
            RenderCommand::new(index().with_failing_loads(), Config::default()).run("rust");

        assert!(!output.success);
        assert!(output.error.unwrap().contains("index error"));
    }

    #[test]
    fn test_format_json() {
        let output = RenderCommand::new(index(), Config::default()).run("rust");
        let options = RenderOptions {
            json: true,
            ..Default::default()
        };

        let json = RenderCommand::format_output(&output, &options);
        let parsed: RenderOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, output);
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_format_quiet() {
        let output = RenderOutput::failure("q", "boom");
        let options = RenderOptions {
            quiet: true,
            ..Default::default()
        };
        assert!(RenderCommand::format_output(&output, &options).is_empty());
    }

    #[test]
    fn test_format_failure() {
        let output = RenderOutput::failure("q", "boom");
        assert_eq!(
            RenderCommand::format_output(&output, &RenderOptions::default()),
            "Render failed: boom\n"
        );
    }
}
