mod cli;
mod config;
mod error;
mod graph;
mod parser;
mod query;

use std::io::{ErrorKind, IsTerminal, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::RdepsConfig;
use graph::DependencyGraph;
use query::dependents::find_dependents;
use query::output::render_dependents;
use query::report::group_by_depth;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for reports.
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => RdepsConfig::load_file(path)?,
        None => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            RdepsConfig::load(&cwd)
        }
    };
    let options = cli.search_options(&config);
    let format = cli.output_format(&config);
    tracing::debug!(
        input_file = %cli.input_file.display(),
        package = %cli.package,
        max_depth = options.max_depth,
        root_sentinel = ?options.root_sentinel,
        ?format,
        "resolved options"
    );

    let source = parser::read_input(&cli.input_file)
        .with_context(|| format!("failed to read {}", cli.input_file.display()))?;
    let dot = parser::parse_dot(&source)
        .with_context(|| format!("failed to parse {}", cli.input_file.display()))?;
    let graph = DependencyGraph::from_dot(&dot);
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded dependency graph"
    );

    let records = find_dependents(&graph, &cli.package, &options)?;
    let tiers = group_by_depth(&records);
    tracing::info!(
        package = %cli.package,
        dependents = records.len(),
        max_found_depth = tiers.last().map_or(0, |t| t.depth),
        "dependents search complete"
    );

    let report = render_dependents(
        &cli.package,
        options.depth_limit(),
        &tiers,
        &format,
        std::io::stdout().is_terminal(),
    );
    // A reader that stops early (`| head`) is not a failure.
    let mut stdout = std::io::stdout().lock();
    match stdout
        .write_all(report.as_bytes())
        .and_then(|()| stdout.flush())
    {
        Err(err) if err.kind() != ErrorKind::BrokenPipe => {
            Err(err).context("failed to write report to stdout")
        }
        _ => Ok(()),
    }
}
