use std::collections::HashSet;

use petgraph::stable_graph::NodeIndex;

use crate::error::QueryError;
use crate::graph::DependencyGraph;

/// A package that transitively depends on the queried package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentRecord {
    /// Canonical package name.
    pub name: String,
    /// Shortest number of reverse edges from the queried package; direct dependents are 1.
    pub depth: usize,
}

/// Knobs for a single dependents search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum depth to report. Zero or negative means unbounded.
    pub max_depth: i64,
    /// Synthetic root node (e.g. `RPM-Packages`) that is never reported.
    pub root_sentinel: Option<String>,
}

impl SearchOptions {
    /// The positive depth bound, or `None` when unbounded.
    pub fn depth_limit(&self) -> Option<usize> {
        usize::try_from(self.max_depth).ok().filter(|&d| d > 0)
    }
}

/// Find every package that transitively depends on `target`, each at its shortest depth.
///
/// Walks INCOMING edges one full BFS layer at a time: every dependent at depth D is
/// recorded before any at depth D+1, so a package reachable along several paths is
/// recorded once, at the length of the shortest one. The target and the root sentinel
/// are seeded as visited and never appear in the result, even through cycles.
///
/// Records are returned in discovery order: depth ascending, and within a depth in
/// frontier order, then edge-declaration order.
pub fn find_dependents(
    graph: &DependencyGraph,
    target: &str,
    options: &SearchOptions,
) -> Result<Vec<DependentRecord>, QueryError> {
    let target_idx = graph
        .find_exact(target)
        .ok_or_else(|| QueryError::NotFound {
            name: target.to_owned(),
        })?;
    let limit = options.depth_limit();

    let mut visited: HashSet<NodeIndex> = HashSet::new();
    visited.insert(target_idx);
    if let Some(sentinel_idx) = options
        .root_sentinel
        .as_deref()
        .and_then(|name| graph.find_exact(name))
    {
        visited.insert(sentinel_idx);
    }

    let mut results: Vec<DependentRecord> = Vec::new();
    let mut frontier: Vec<NodeIndex> = vec![target_idx];
    let mut depth = 0usize;

    while !frontier.is_empty() {
        depth += 1;
        if limit.is_some_and(|max| depth > max) {
            break;
        }

        let mut next: Vec<NodeIndex> = Vec::new();
        for &node in &frontier {
            for dependent in graph.direct_predecessors(node) {
                if visited.insert(dependent) {
                    results.push(DependentRecord {
                        name: graph.node_name(dependent).to_owned(),
                        depth,
                    });
                    next.push(dependent);
                }
            }
        }

        tracing::trace!(depth, discovered = next.len(), "expanded dependents layer");
        frontier = next;
    }

    Ok(results)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
