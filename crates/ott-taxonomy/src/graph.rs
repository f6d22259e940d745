//! Directed taxonomy graph
//!
//! Nodes are taxon identifiers; each edge points from a parent to a child.
//! The graph is derived from a [`TaxonomyTable`] on demand and owns no state
//! shared with it.
//!
//! Reachability is computed by breadth-first search and tolerates cycles and
//! disconnected components, which malformed inputs may contain.

use crate::taxonomy::{TaxonId, TaxonomyTable};
use ott_common::{OttError, Result};
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Bfs;
use petgraph::Direction;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

/// Parent-to-child graph over taxon identifiers
#[derive(Debug, Clone, Default)]
pub struct TaxonomyGraph {
    graph: DiGraphMap<TaxonId, ()>,
}

impl TaxonomyGraph {
    /// Build the full graph of a taxonomy
    ///
    /// Every `uid` becomes a node. Every row except the first (the root)
    /// contributes a `parent_uid -> uid` edge.
    pub fn from_taxonomy(taxonomy: &TaxonomyTable) -> Result<Self> {
        if taxonomy.is_empty() {
            return Err(OttError::NoTaxonomyLoaded);
        }

        let taxa = taxonomy.taxa();
        let mut graph = DiGraphMap::with_capacity(taxa.len(), taxa.len().saturating_sub(1));

        for taxon in taxa {
            graph.add_node(taxon.uid);
        }

        for taxon in taxa.iter().skip(1) {
            match taxon.parent_uid {
                Some(parent) => {
                    graph.add_edge(parent, taxon.uid, ());
                },
                None => warn!(uid = taxon.uid, "Non-root taxon without parent, no edge added"),
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Built taxonomy graph"
        );
        Ok(Self { graph })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_node(&self, node: TaxonId) -> bool {
        self.graph.contains_node(node)
    }

    pub fn contains_edge(&self, parent: TaxonId, child: TaxonId) -> bool {
        self.graph.contains_edge(parent, child)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = TaxonId> + '_ {
        self.graph.nodes()
    }

    /// `(parent, child)` pairs; the order carries no meaning
    pub fn edges(&self) -> impl Iterator<Item = (TaxonId, TaxonId)> + '_ {
        self.graph.all_edges().map(|(parent, child, _)| (parent, child))
    }

    /// Direct children of a node
    pub fn children(&self, node: TaxonId) -> impl Iterator<Item = TaxonId> + '_ {
        self.graph.neighbors_directed(node, Direction::Outgoing)
    }

    /// Every node reachable from `node`, excluding `node` itself
    pub fn descendants(&self, node: TaxonId) -> Result<HashSet<TaxonId>> {
        if !self.graph.contains_node(node) {
            return Err(OttError::TaxonNotFound(node));
        }

        let mut descendants = HashSet::new();
        let mut bfs = Bfs::new(&self.graph, node);
        while let Some(next) = bfs.next(&self.graph) {
            if next != node {
                descendants.insert(next);
            }
        }
        Ok(descendants)
    }

    /// Union of the descendants of `roots`; roots missing from the graph are ignored
    ///
    /// Each root contributes its own descendants only, so a root on a cycle is
    /// not its own descendant. Another root may still reach it.
    pub fn descendants_of_all<I>(&self, roots: I) -> HashSet<TaxonId>
    where
        I: IntoIterator<Item = TaxonId>,
    {
        let mut reached = HashSet::new();
        let mut queue = VecDeque::new();

        for root in roots.into_iter().filter(|root| self.graph.contains_node(*root)) {
            let mut visited = HashSet::from([root]);
            queue.extend(self.children(root));

            while let Some(node) = queue.pop_front() {
                if visited.insert(node) {
                    reached.insert(node);
                    queue.extend(self.children(node));
                }
            }
        }
        reached
    }

    /// Remove nodes and their incident edges, returning how many were present
    pub fn remove_nodes<I>(&mut self, nodes: I) -> usize
    where
        I: IntoIterator<Item = TaxonId>,
    {
        nodes
            .into_iter()
            .filter(|node| self.graph.remove_node(*node))
            .count()
    }

    /// Subgraph induced by `nodes`: those nodes plus every edge between them
    pub fn induced_subgraph(&self, nodes: &HashSet<TaxonId>) -> Self {
        let mut graph = DiGraphMap::with_capacity(nodes.len(), nodes.len());

        for node in self.graph.nodes().filter(|n| nodes.contains(n)) {
            graph.add_node(node);
        }

        for (parent, child, _) in self.graph.all_edges() {
            if nodes.contains(&parent) && nodes.contains(&child) {
                graph.add_edge(parent, child, ());
            }
        }

        Self { graph }
    }

    /// Subgraph induced by `node` and its descendants
    pub fn descendant_subgraph(&self, node: TaxonId) -> Result<Self> {
        let mut keep = self.descendants(node)?;
        keep.insert(node);
        Ok(self.induced_subgraph(&keep))
    }

    /// Remove every descendant of the given species from the whole graph
    ///
    /// Returns the number of nodes removed.
    pub fn prune_subordinate_ranks<I>(&mut self, species: I) -> usize
    where
        I: IntoIterator<Item = TaxonId>,
    {
        let subordinate = self.descendants_of_all(species);
        let removed = self.remove_nodes(subordinate);
        debug!(removed, "Pruned subordinate-rank taxa");
        removed
    }

    pub fn as_graphmap(&self) -> &DiGraphMap<TaxonId, ()> {
        &self.graph
    }

    pub fn into_graphmap(self) -> DiGraphMap<TaxonId, ()> {
        self.graph
    }
}
