use std::fmt::Write;

use crate::cli::OutputFormat;
use crate::query::report::DepthTier;

// ---------------------------------------------------------------------------
// Dependents output
// ---------------------------------------------------------------------------

/// Render a depth-grouped dependents report.
///
/// - `package`: the queried package (used by the table footer and JSON output)
/// - `depth_limit`: the effective depth bound, `None` when unbounded
/// - `use_color`: bold table headers; callers pass whether stdout is a terminal
///
/// With no tiers, compact output is empty and JSON has an empty `depths` array.
pub fn render_dependents(
    package: &str,
    depth_limit: Option<usize>,
    tiers: &[DepthTier],
    format: &OutputFormat,
    use_color: bool,
) -> String {
    match format {
        OutputFormat::Compact => format_compact(tiers),
        OutputFormat::Table => format_table(package, tiers, use_color),
        OutputFormat::Json => format_json(package, depth_limit, tiers),
    }
}

/// ```text
/// depth 1 (num 2):
///     1. A
///     2. C
/// ```
/// (members are indented with a tab)
fn format_compact(tiers: &[DepthTier]) -> String {
    let mut out = String::new();
    for tier in tiers {
        writeln!(out, "depth {} (num {}):", tier.depth, tier.packages.len()).unwrap();
        for (i, name) in tier.packages.iter().enumerate() {
            writeln!(out, "\t{}. {}", i + 1, name).unwrap();
        }
    }
    out
}

fn format_table(package: &str, tiers: &[DepthTier], use_color: bool) -> String {
    let mut out = String::new();
    // Column widths: auto-sized to data.
    let name_w = tiers
        .iter()
        .flat_map(|t| t.packages.iter())
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(7)
        .max(7);

    if use_color {
        writeln!(
            out,
            "\x1b[1m{:>5}  {:>4}  {:<name_w$}\x1b[0m",
            "DEPTH",
            "#",
            "PACKAGE",
            name_w = name_w,
        )
        .unwrap();
    } else {
        writeln!(
            out,
            "{:>5}  {:>4}  {:<name_w$}",
            "DEPTH",
            "#",
            "PACKAGE",
            name_w = name_w,
        )
        .unwrap();
    }
    writeln!(out, "{}", "-".repeat(name_w + 13)).unwrap();

    let mut total = 0usize;
    for tier in tiers {
        for (i, name) in tier.packages.iter().enumerate() {
            writeln!(
                out,
                "{:>5}  {:>4}  {:<name_w$}",
                tier.depth,
                i + 1,
                name,
                name_w = name_w,
            )
            .unwrap();
        }
        total += tier.packages.len();
    }
    writeln!(out, "{} dependents of {}", total, package).unwrap();
    out
}

fn format_json(package: &str, depth_limit: Option<usize>, tiers: &[DepthTier]) -> String {
    let total: usize = tiers.iter().map(|t| t.packages.len()).sum();
    let depths: Vec<serde_json::Value> = tiers
        .iter()
        .map(|t| {
            serde_json::json!({
                "depth": t.depth,
                "count": t.packages.len(),
                "packages": t.packages,
            })
        })
        .collect();
    let json = serde_json::json!({
        "package": package,
        "max_depth": depth_limit,
        "total": total,
        "depths": depths,
    });
    format!("{}\n", serde_json::to_string_pretty(&json).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
