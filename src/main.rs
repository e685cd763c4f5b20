//! sitesearch - search box controller for static-site search indexes
//!
//! CLI entry point.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use sitesearch::cli::config_cmd::{ConfigCommand, ConfigOptions};
use sitesearch::cli::render::{RenderCommand, RenderOptions};
use sitesearch::config::Config;
use sitesearch::error::exit_codes;
use sitesearch::index::FixedIndex;

// =============================================================================
// CLI Definition
// =============================================================================

/// sitesearch - search box controller for static-site search indexes
#[derive(Parser)]
#[command(name = "sitesearch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the results list for a query from recorded results
    Render {
        /// Text typed into the search box
        query: String,
        /// JSON array of result payloads (reads stdin when omitted)
        #[arg(long, short)]
        results: Option<PathBuf>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show the effective configuration
    Config {
        /// Output as JSON instead of TOML
        #[arg(long, short)]
        json: bool,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("sitesearch error: {}", e);
            ExitCode::from(exit_codes::FAILURE as u8)
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            query,
            results,
            json,
            quiet,
        } => run_render(&query, results, json, quiet),
        Commands::Config { json } => run_config(json),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::FAILURE as u8)
    }
}

fn run_render(
    query: &str,
    results: Option<PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Config::load();

    let index = match results {
        Some(path) => FixedIndex::from_file(&path)?,
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            FixedIndex::from_json_str(&input)?
        }
    };

    let options = RenderOptions { json, quiet };
    let output = RenderCommand::new(index, config).run(query);
    let formatted = RenderCommand::format_output(&output, &options);

    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_config(json: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Config::load();
    let output = ConfigCommand::new(config).run(&ConfigOptions { json })?;
    println!("{}", output);
    Ok(ExitCode::from(exit_codes::SUCCESS as u8))
}
