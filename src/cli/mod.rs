//! CLI commands for sitesearch.
//!
//! - **render**: run the search box against recorded results and print the list
//! - **config**: print the effective configuration

pub mod config_cmd;
pub mod render;

pub use config_cmd::ConfigCommand;
pub use render::RenderCommand;
