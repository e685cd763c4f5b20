//! Configuration loading for sitesearch.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.sitesearch/config.toml`)
//! 3. User config (`~/.sitesearch/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The defaults reproduce the stock search
//! box: a 200ms debounce, five results, and the `nav-search`,
//! `search-clear` and `search-results` element ids.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{FailOpen, Result, SiteSearchError};
use crate::index::SearchOptions;
use crate::render::ExcerptPolicy;

/// Main configuration struct for sitesearch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// How searches are issued.
    pub search: SearchConfig,
    /// Which page elements the controller binds to.
    pub dom: DomConfig,
    /// How results are rendered.
    pub render: RenderConfig,
}

/// Search issuing configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before a keystroke turns into a search.
    pub debounce_ms: u32,
    /// How many hits get their detail payload loaded and rendered.
    pub max_results: usize,
    /// Options passed through to the index with every search.
    pub options: SearchOptions,
}

/// Smallest accepted `max_results`.
pub const MIN_MAX_RESULTS: usize = 1;

impl SearchConfig {
    /// Check if a max results value is valid.
    pub fn is_valid_max_results(value: usize) -> bool {
        value >= MIN_MAX_RESULTS
    }

    /// The debounce window as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(u64::from(self.debounce_ms))
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            max_results: 5,
            options: SearchOptions::default(),
        }
    }
}

/// Element ids and styling used by the browser host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DomConfig {
    /// Container whose first element child is the search input.
    pub search_container_id: String,
    /// Control that clears the search.
    pub clear_button_id: String,
    /// Container whose first element child is the results list.
    pub results_container_id: String,
    /// CSS `display` value used when the results container is shown.
    pub visible_display: String,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            search_container_id: "nav-search".to_string(),
            clear_button_id: "search-clear".to_string(),
            results_container_id: "search-results".to_string(),
            visible_display: "flex".to_string(),
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Header line above a non-empty result list.
    pub results_heading: String,
    /// Message shown when a non-empty query has no results.
    pub no_results_message: String,
    /// How excerpt markup from the index is treated.
    pub excerpt_policy: ExcerptPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            results_heading: "Search results:".to_string(),
            no_results_message: "No results found".to_string(),
            excerpt_policy: ExcerptPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.sitesearch/config.toml` in cwd)
    /// 3. User config (`~/.sitesearch/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `<sitesearch home>/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = sitesearch_home()?;
        Self::load_optional(&home.join("config.toml"))
    }

    /// Load project config from `.sitesearch/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_optional(&project_config_path(cwd))
    }

    /// Load a config file if it exists. A file that exists but fails to
    /// parse is skipped with a warning.
    fn load_optional(path: &Path) -> Option<Config> {
        if !path.is_file() {
            return None;
        }
        Self::load_from_file(path)
            .map(Some)
            .fail_open_with("loading config", None)
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| SiteSearchError::storage(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| SiteSearchError::config(e.to_string()))
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SiteSearchError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // SITESEARCH_DEBOUNCE_MS
        if let Ok(val) = env::var("SITESEARCH_DEBOUNCE_MS") {
            match val.parse::<u32>() {
                Ok(n) => self.search.debounce_ms = n,
                Err(_) => tracing::warn!(
                    "Invalid SITESEARCH_DEBOUNCE_MS value '{}'. \
                    Expected a non-negative integer. Using '{}'.",
                    val,
                    self.search.debounce_ms
                ),
            }
        }

        // SITESEARCH_MAX_RESULTS
        if let Ok(val) = env::var("SITESEARCH_MAX_RESULTS") {
            match val.parse::<usize>() {
                Ok(n) if SearchConfig::is_valid_max_results(n) => self.search.max_results = n,
                Ok(n) => tracing::warn!(
                    "Invalid SITESEARCH_MAX_RESULTS value '{}'. Must be >= {}. Using '{}'.",
                    n,
                    MIN_MAX_RESULTS,
                    self.search.max_results
                ),
                Err(_) => tracing::warn!(
                    "Invalid SITESEARCH_MAX_RESULTS value '{}'. \
                    Expected a positive integer. Using '{}'.",
                    val,
                    self.search.max_results
                ),
            }
        }

        // SITESEARCH_EXCERPT_POLICY
        if let Ok(val) = env::var("SITESEARCH_EXCERPT_POLICY") {
            match val.parse::<ExcerptPolicy>() {
                Ok(policy) => self.render.excerpt_policy = policy,
                Err(e) => tracing::warn!(
                    "{}. Using '{}'.",
                    e,
                    self.render.excerpt_policy.as_str()
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// Values in `other` that differ from the defaults take precedence.
    fn merge(mut self, other: Config) -> Self {
        let default_search = SearchConfig::default();
        if other.search.debounce_ms != default_search.debounce_ms {
            self.search.debounce_ms = other.search.debounce_ms;
        }
        if other.search.max_results != default_search.max_results {
            if SearchConfig::is_valid_max_results(other.search.max_results) {
                self.search.max_results = other.search.max_results;
            } else {
                tracing::warn!(
                    "Ignoring search.max_results = {} (must be >= {})",
                    other.search.max_results,
                    MIN_MAX_RESULTS
                );
            }
        }
        if other.search.options != default_search.options {
            self.search.options = other.search.options;
        }

        let default_dom = DomConfig::default();
        if other.dom.search_container_id != default_dom.search_container_id {
            self.dom.search_container_id = other.dom.search_container_id;
        }
        if other.dom.clear_button_id != default_dom.clear_button_id {
            self.dom.clear_button_id = other.dom.clear_button_id;
        }
        if other.dom.results_container_id != default_dom.results_container_id {
            self.dom.results_container_id = other.dom.results_container_id;
        }
        if other.dom.visible_display != default_dom.visible_display {
            self.dom.visible_display = other.dom.visible_display;
        }

        let default_render = RenderConfig::default();
        if other.render.results_heading != default_render.results_heading {
            self.render.results_heading = other.render.results_heading;
        }
        if other.render.no_results_message != default_render.no_results_message {
            self.render.no_results_message = other.render.no_results_message;
        }
        if other.render.excerpt_policy != default_render.excerpt_policy {
            self.render.excerpt_policy = other.render.excerpt_policy;
        }

        self
    }
}

/// Get the sitesearch home directory.
///
/// `SITESEARCH_HOME` wins when set and non-empty; otherwise `~/.sitesearch`.
pub fn sitesearch_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("SITESEARCH_HOME") {
        if home.is_empty() {
            tracing::warn!("SITESEARCH_HOME is empty, using default");
        } else {
            return Some(PathBuf::from(home));
        }
    }

    dirs::home_dir().map(|home| home.join(".sitesearch"))
}

/// Path of the project config file for a directory.
pub fn project_config_path(cwd: &Path) -> PathBuf {
    cwd.join(".sitesearch").join("config.toml")
}
