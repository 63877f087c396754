pub mod node;

use std::collections::HashMap;

use petgraph::Directed;
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;

use crate::parser::dot::DotGraph;
use node::{DependsOn, PackageNode, canonical_name};

/// The in-memory SBOM dependency graph: a directed petgraph StableGraph with an O(1) name index.
///
/// An edge `A -> B` means "A depends on B". Names are canonicalized once, on insertion;
/// everything downstream works with canonical names only.
pub struct DependencyGraph {
    /// The underlying directed graph.
    pub graph: StableGraph<PackageNode, DependsOn, Directed>,
    /// Maps canonical package names to their node indices.
    pub name_index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty dependency graph.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            name_index: HashMap::new(),
        }
    }

    /// Build a graph from a parsed DOT document.
    ///
    /// Declared nodes are added first, in declaration order, then every edge in declaration
    /// order. Edges are not deduplicated.
    pub fn from_dot(dot: &DotGraph) -> Self {
        tracing::debug!(
            id = ?dot.id,
            strict = dot.strict,
            directed = dot.directed,
            node_mentions = dot.nodes.len(),
            edges = dot.edges.len(),
            "building dependency graph"
        );
        if !dot.directed {
            tracing::warn!("input is an undirected graph; edges are read in declared orientation");
        }

        let mut graph = Self::new();
        for raw in &dot.nodes {
            graph.add_node(raw);
        }
        for (src, dst) in &dot.edges {
            graph.add_edge(src, dst);
        }
        graph
    }

    /// Add a package node by its raw (possibly quoted) name.
    /// If a node with the same canonical name exists, returns the existing index.
    pub fn add_node(&mut self, raw: &str) -> NodeIndex {
        let name = canonical_name(raw);
        if let Some(&existing) = self.name_index.get(name) {
            return existing;
        }
        let idx = self.graph.add_node(PackageNode {
            name: name.to_owned(),
        });
        self.name_index.insert(name.to_owned(), idx);
        idx
    }

    /// Add a `src depends on dst` edge, creating either endpoint if it does not exist yet.
    pub fn add_edge(&mut self, raw_src: &str, raw_dst: &str) -> EdgeIndex {
        let src = self.add_node(raw_src);
        let dst = self.add_node(raw_dst);
        self.graph.add_edge(src, dst, DependsOn)
    }

    /// Exact, case-sensitive lookup of a canonical package name.
    pub fn find_exact(&self, name: &str) -> Option<NodeIndex> {
        self.name_index.get(name).copied()
    }

    /// Canonical name of the node at `idx`.
    pub fn node_name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx].name
    }

    /// Source of every edge pointing at `idx`, in edge-declaration order.
    ///
    /// Duplicate edges yield duplicate entries; callers dedupe.
    pub fn direct_predecessors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        // StableGraph walks incoming edges newest-first; edge indices are allocated in
        // insertion order and the graph is never pruned, so sorting restores declaration order.
        let mut incoming: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|edge_ref| (edge_ref.id(), edge_ref.source()))
            .collect();
        incoming.sort_by_key(|&(edge, _)| edge.index());
        incoming.into_iter().map(|(_, source)| source).collect()
    }

    /// Number of package nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges, duplicates included.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
