use crate::errors::{GraphError, Result};
use crate::graph::PertGraph;

use indicatif::ParallelProgressIterator;
use log::info;
use petgraph::algo::dijkstra;
use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// Components smaller than this are ignored by the analyzer.
pub const DEFAULT_MIN_COMPONENT_SIZE: usize = 4;

/// All-pairs shortest-path distances keyed by node label. Unreachable
/// pairs are simply absent.
pub struct DistanceMap {
    dist: HashMap<Box<str>, HashMap<Box<str>, f64>>,
}

impl DistanceMap {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.dist.get(a)?.get(b).copied()
    }

    pub fn n_sources(&self) -> usize {
        self.dist.len()
    }
}

/// Dijkstra from every node, treating edge weights as distances.
pub fn all_pairs_distances(graph: &PertGraph) -> DistanceMap {
    let g = graph.inner();
    let nodes: Vec<NodeIndex> = g.node_indices().collect();
    let njobs = nodes.len() as u64;

    let dist: HashMap<Box<str>, HashMap<Box<str>, f64>> = nodes
        .par_iter()
        .progress_count(njobs)
        .map(|&s| {
            let by_label = dijkstra(g, s, None, |e| *e.weight())
                .into_iter()
                .map(|(t, d)| (g[t].label.clone(), d))
                .collect::<HashMap<_, _>>();
            (g[s].label.clone(), by_label)
        })
        .collect();

    info!("all-pairs distances from {} sources", dist.len());

    DistanceMap { dist }
}

/// Connected components of at least `min_size` nodes, found by
/// union-find over the edge list. Components come out ordered by
/// first-seen node, members in node insertion order.
pub fn connected_components(graph: &PertGraph, min_size: usize) -> Vec<Vec<Box<str>>> {
    let g = graph.inner();
    let mut uf = UnionFind::<usize>::new(g.node_count());

    for edge in g.edge_references() {
        uf.union(edge.source().index(), edge.target().index());
    }

    let mut members: HashMap<usize, Vec<Box<str>>> = HashMap::new();
    let mut order: Vec<usize> = vec![];

    for idx in g.node_indices() {
        let root = uf.find(idx.index());
        let entry = members.entry(root).or_default();
        if entry.is_empty() {
            order.push(root);
        }
        entry.push(g[idx].label.clone());
    }

    order
        .into_iter()
        .filter_map(|root| {
            let comp = members.remove(&root)?;
            (comp.len() >= min_size).then_some(comp)
        })
        .collect()
}

/// Per-component cohesion statistics.
pub struct ComponentDistances {
    /// Surviving components, each a list of node labels.
    pub components: Vec<Vec<Box<str>>>,
    /// Internal/external mean-distance ratio, parallel to `components`.
    pub ratios: Vec<f64>,
    /// Arithmetic mean over `ratios`.
    pub mean_ratio: f64,
}

/// For each component of `subgraph` with at least `min_size` members,
/// the ratio of its mean internal pairwise distance to the mean
/// distance from members to all external nodes, both measured on the
/// *full* graph's shortest-path metric.
///
/// Unreachable pairs carry no distance and are skipped; a component
/// with no usable internal pairs, no external candidates, or a zero
/// external mean is an explicit `EmptyMean` error.
///
/// * `full` - graph defining the distance metric
/// * `subgraph` - (possibly pruned) graph whose components are scored
/// * `min_size` - smallest component worth reporting
///
pub fn distance_ratios(
    full: &PertGraph,
    subgraph: &PertGraph,
    min_size: usize,
) -> Result<ComponentDistances> {
    let dist = all_pairs_distances(full);
    let components = connected_components(subgraph, min_size);

    if components.is_empty() {
        return Err(GraphError::EmptyMean("no component reaches minimum size"));
    }

    let all_labels = full.labels();
    let mut ratios = Vec::with_capacity(components.len());

    for comp in components.iter() {
        let in_comp: HashSet<&str> = comp.iter().map(|l| l.as_ref()).collect();
        let external: Vec<&Box<str>> = all_labels
            .iter()
            .filter(|l| !in_comp.contains(l.as_ref()))
            .collect();

        if external.is_empty() {
            return Err(GraphError::EmptyMean("no nodes outside component"));
        }

        let internal = mean_over_pairs(
            &dist,
            comp.iter()
                .flat_map(|a| comp.iter().map(move |b| (a, b)))
                .filter(|(a, b)| a != b),
        )
        .ok_or(GraphError::EmptyMean("no internal pairwise distances"))?;

        let external = mean_over_pairs(
            &dist,
            comp.iter()
                .flat_map(|a| external.iter().map(move |&b| (a, b))),
        )
        .ok_or(GraphError::EmptyMean("no member-to-external distances"))?;

        if external == 0.0 {
            return Err(GraphError::EmptyMean("external mean distance is zero"));
        }

        ratios.push(internal / external);
    }

    let mean_ratio = ratios.iter().sum::<f64>() / ratios.len() as f64;

    info!(
        "{} components, mean distance ratio {:.4}",
        ratios.len(),
        mean_ratio
    );

    Ok(ComponentDistances {
        components,
        ratios,
        mean_ratio,
    })
}

/// Mean of the defined distances over the given label pairs; `None`
/// when no pair has a defined distance.
fn mean_over_pairs<'a>(
    dist: &DistanceMap,
    pairs: impl Iterator<Item = (&'a Box<str>, &'a Box<str>)>,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for (a, b) in pairs {
        if let Some(d) = dist.get(a, b) {
            sum += d;
            count += 1;
        }
    }
    (count > 0).then(|| sum / count as f64)
}
