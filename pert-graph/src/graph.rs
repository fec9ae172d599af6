use crate::errors::{GraphError, Result};
use crate::metadata::{MetadataStore, Record};

use gctx_util::ScoreTable;
use log::info;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Scores are percent-like similarities; the distance-oriented variant
/// stores `100 - weight` so that higher similarity means shorter edges.
pub const SIMILARITY_CEILING: f64 = 100.0;

/// One graph node: a perturbation identifier plus its metadata record.
#[derive(Debug, Clone)]
pub struct PertNode {
    pub label: Box<str>,
    pub metadata: Record,
}

/// What to do when the metadata store has no record for a node label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingMetadata {
    /// Fail the whole build (default).
    #[default]
    Fail,
    /// Attach an empty record and keep going.
    AttachEmpty,
}

/// Graph construction parameters.
pub struct GraphArgs {
    /// Keep only pairs whose averaged score is at least this value.
    pub min_weight: Option<f64>,
    /// Store `100 - weight` so edge weights behave as distances.
    pub as_distance: bool,
    pub on_missing: MissingMetadata,
}

impl Default for GraphArgs {
    fn default() -> Self {
        Self {
            min_weight: None,
            as_distance: false,
            on_missing: MissingMetadata::Fail,
        }
    }
}

/// Weighted undirected graph over perturbation identifiers.
pub struct PertGraph {
    graph: UnGraph<PertNode, f64>,
    index: HashMap<Box<str>, NodeIndex>,
}

impl PertGraph {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            index: HashMap::new(),
        }
    }

    /// Build a graph from a square adjacency table.
    ///
    /// One node per label, annotated with the store's metadata record.
    /// For every unordered pair with both `[i][j]` and `[j][i]`
    /// present, the edge weight is their average; pairs below
    /// `args.min_weight` (if set) produce no edge. No self-loops, no
    /// duplicate edges.
    ///
    /// * `table` - square score table, rows and columns in the same order
    /// * `store` - metadata lookup keyed by node label
    /// * `args` - construction parameters
    ///
    pub fn from_adjacency(
        table: &ScoreTable,
        store: &impl MetadataStore,
        args: &GraphArgs,
    ) -> Result<Self> {
        if table.nrows() != table.ncols() {
            return Err(GraphError::NotSquare {
                nrows: table.nrows(),
                ncols: table.ncols(),
            });
        }

        let labels = table.columns();
        for (i, (r, c)) in table.rows().iter().zip(labels.iter()).enumerate() {
            if r != c {
                return Err(GraphError::AxisMismatch(i));
            }
        }

        let mut ret = Self::new();

        for label in labels {
            let metadata = match store.find_by_label(label)? {
                Some(record) => record,
                None => match args.on_missing {
                    MissingMetadata::Fail => {
                        return Err(GraphError::MetadataMissing(label.clone()))
                    }
                    MissingMetadata::AttachEmpty => Record::new(),
                },
            };
            ret.add_node(label, metadata);
        }

        let nn = labels.len();
        for i in 0..nn {
            for j in (i + 1)..nn {
                let ij = table.get(&labels[i], &labels[j]);
                let ji = table.get(&labels[j], &labels[i]);
                let (Some(ij), Some(ji)) = (ij, ji) else {
                    continue;
                };

                let weight = (ij + ji) / 2.0;
                if let Some(cutoff) = args.min_weight {
                    if weight < cutoff {
                        continue;
                    }
                }

                let weight = if args.as_distance {
                    SIMILARITY_CEILING - weight
                } else {
                    weight
                };
                ret.add_edge(&labels[i], &labels[j], weight)?;
            }
        }

        info!(
            "built graph with {} nodes and {} edges",
            ret.node_count(),
            ret.edge_count()
        );

        Ok(ret)
    }

    /// Copy of this graph without edges heavier than `max_weight` and
    /// without the nodes left isolated by that removal; degree-1 nodes
    /// survive. The original graph is untouched.
    pub fn prune(&self, max_weight: f64) -> PertGraph {
        let kept_edges: Vec<(NodeIndex, NodeIndex, f64)> = self
            .graph
            .edge_references()
            .filter(|e| *e.weight() <= max_weight)
            .map(|e| (e.source(), e.target(), *e.weight()))
            .collect();

        let mut kept_nodes: Vec<bool> = vec![false; self.graph.node_count()];
        for &(a, b, _) in kept_edges.iter() {
            kept_nodes[a.index()] = true;
            kept_nodes[b.index()] = true;
        }

        let mut ret = Self::new();
        let mut remap: Vec<Option<NodeIndex>> = vec![None; self.graph.node_count()];
        for idx in self.graph.node_indices() {
            if kept_nodes[idx.index()] {
                let node = &self.graph[idx];
                remap[idx.index()] = Some(ret.add_node(&node.label, node.metadata.clone()));
            }
        }

        for (a, b, weight) in kept_edges {
            if let (Some(ia), Some(ib)) = (remap[a.index()], remap[b.index()]) {
                ret.graph.update_edge(ia, ib, weight);
            }
        }

        info!(
            "pruned at {}: {} -> {} edges, {} -> {} nodes",
            max_weight,
            self.edge_count(),
            ret.edge_count(),
            self.node_count(),
            ret.node_count()
        );

        ret
    }

    /// Insert a node if the label is new; existing nodes are left alone.
    pub fn add_node(&mut self, label: &str, metadata: Record) -> NodeIndex {
        match self.index.get(label) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(PertNode {
                    label: label.into(),
                    metadata,
                });
                self.index.insert(label.into(), idx);
                idx
            }
        }
    }

    /// Insert an undirected edge between two existing labels,
    /// replacing any previous edge weight between them.
    pub fn add_edge(&mut self, a: &str, b: &str, weight: f64) -> Result<()> {
        let ia = self.node_index(a)?;
        let ib = self.node_index(b)?;
        self.graph.update_edge(ia, ib, weight);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Node labels in insertion order.
    pub fn labels(&self) -> Vec<Box<str>> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].label.clone())
            .collect()
    }

    pub fn metadata(&self, label: &str) -> Option<&Record> {
        let idx = *self.index.get(label)?;
        Some(&self.graph[idx].metadata)
    }

    pub fn edge_weight(&self, a: &str, b: &str) -> Option<f64> {
        let ia = *self.index.get(a)?;
        let ib = *self.index.get(b)?;
        let edge = self.graph.find_edge(ia, ib)?;
        self.graph.edge_weight(edge).copied()
    }

    pub fn degree(&self, label: &str) -> Option<usize> {
        let idx = *self.index.get(label)?;
        Some(self.graph.edges(idx).count())
    }

    /// The underlying petgraph storage, for algorithms.
    pub fn inner(&self) -> &UnGraph<PertNode, f64> {
        &self.graph
    }

    pub(crate) fn node_index(&self, label: &str) -> Result<NodeIndex> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(label.into()))
    }
}

impl Default for PertGraph {
    fn default() -> Self {
        Self::new()
    }
}
