use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::config::RdepsConfig;
use crate::query::dependents::SearchOptions;

/// Find every package in an SBOM dependency graph that transitively depends on a given package.
///
/// Reads a Graphviz DOT graph in which `A -> B` means "A depends on B", then reports the
/// dependents of --package grouped by their shortest distance from it.
#[derive(Parser, Debug)]
#[command(name = "sbom-rdeps", version, about, long_about = None)]
pub struct Cli {
    /// SBOM dependency graph in DOT format (`-` reads stdin).
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input_file: PathBuf,

    /// Target package name (exact, case-sensitive match).
    #[arg(short, long, value_name = "NAME", value_parser = parse_package_name)]
    pub package: String,

    /// Maximum depth to report; zero or negative means unlimited [default: -1].
    #[arg(short, long, value_name = "N", allow_negative_numbers = true)]
    pub depth: Option<i64>,

    /// Output format [default: compact].
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Name of the synthetic root node to exclude from results [default: RPM-Packages].
    #[arg(long, value_name = "NAME", conflicts_with = "no_sentinel")]
    pub sentinel: Option<String>,

    /// Do not exclude any root node.
    #[arg(long)]
    pub no_sentinel: bool,

    /// Configuration file [default: ./sbom-rdeps.toml if present].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose logging to stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Output format for query results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `depth N (num M):` headers followed by a numbered, tab-indented list (default).
    #[default]
    Compact,
    /// Human-readable columnar table with optional ANSI bold header when stdout is a terminal.
    Table,
    /// Structured JSON object suitable for programmatic consumption.
    Json,
}

impl Cli {
    /// Resolve search options: command-line flags over config file over built-in defaults.
    pub fn search_options(&self, config: &RdepsConfig) -> SearchOptions {
        let root_sentinel = if self.no_sentinel {
            None
        } else if let Some(name) = &self.sentinel {
            Some(name.clone()).filter(|n| !n.is_empty())
        } else {
            config.root_sentinel().map(str::to_owned)
        };

        SearchOptions {
            max_depth: self.depth.or(config.max_depth).unwrap_or(-1),
            root_sentinel,
        }
    }

    /// Resolve the output format: command-line flag over config file over compact.
    pub fn output_format(&self, config: &RdepsConfig) -> OutputFormat {
        self.format.or(config.format).unwrap_or_default()
    }
}

fn parse_package_name(s: &str) -> Result<String, String> {
    if s.is_empty() {
        Err("package name must not be empty".to_owned())
    } else {
        Ok(s.to_owned())
    }
}
