//! BOM graph builder.
//!
//! Grows a random, connected, multi-parent DAG in three steps:
//!
//! 1. Construction – `num_roots` source nodes, then each new item samples
//!    parents uniformly from all existing nodes.
//! 2. Connectivity repair – first attach any non-root that ended up without
//!    a parent, then link weakly-connected components pairwise until the
//!    graph is a single component.
//! 3. Demand assignment – recompute the leaves (repair can change them) and
//!    give each one a uniform random demand; everything else stays at zero.
//!
//! All randomness comes from a single `StdRng` seeded from
//! [`BomParams::seed`], so the same parameters always rebuild the same
//! graph.

use anyhow::{
    ensure,
    Result,
};
use petgraph::algo::has_path_connecting;
use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rand::rngs::StdRng;
use rand::{
    Rng,
    SeedableRng,
};
use tracing::{
    debug,
    instrument,
};

use crate::model::{
    BomGraph,
    Item,
};

/// Smallest usage quantity an edge can carry.
pub const MIN_EDGE_WEIGHT: u32 = 1;
/// Largest usage quantity an edge can carry.
pub const MAX_EDGE_WEIGHT: u32 = 10;

/// Parameters controlling the shape of the generated BOM.
#[derive(Clone, Debug)]
pub struct BomParams {
    /// Total number of items `n`.
    pub num_items: usize,
    /// Number of initial root (top-level assembly) items; must be `< n`.
    pub num_roots: usize,
    /// Maximum tier depth. Accepted for interface compatibility but not
    /// enforced by the builder; see DESIGN.md.
    pub max_depth: usize,
    /// Maximum number of parents sampled for each non-root item.
    pub max_parents: usize,
    /// Lower demand bound for leaf items.
    pub min_demand: u64,
    /// Upper demand bound for leaf items.
    pub max_demand: u64,
    /// Seed for the builder's private random generator.
    pub seed: u64,
}

/// Build a connected BOM DAG according to `params`.
///
/// The returned graph satisfies: weakly connected, acyclic, every non-root
/// item has at least one parent, every edge weight in
/// `[MIN_EDGE_WEIGHT, MAX_EDGE_WEIGHT]`, and demand positive exactly on the
/// leaves.
#[instrument(skip(params), fields(num_items = params.num_items, seed = params.seed))]
pub fn build(params: &BomParams) -> Result<BomGraph> {
    ensure!(params.num_items > 0, "BOM must contain at least one item");
    ensure!(
        params.num_roots >= 1 && params.num_roots < params.num_items,
        "num_roots must be in [1, num_items), got {} of {}",
        params.num_roots,
        params.num_items
    );
    ensure!(
        params.min_demand <= params.max_demand,
        "min_demand {} exceeds max_demand {}",
        params.min_demand,
        params.max_demand
    );
    // max_depth is part of the parameter surface but no stage bounds edge
    // creation by tier.
    debug!(max_depth = params.max_depth, "max_depth accepted but not enforced");

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut graph = BomGraph::with_capacity(params.num_items, params.num_items * params.max_parents.max(1));

    for id in 0..params.num_roots {
        graph.add_node(Item { id, demand: 0 });
    }

    for id in params.num_roots..params.num_items {
        let available = graph.node_count();
        let num_parents = params.max_parents.min(available);
        let node = graph.add_node(Item { id, demand: 0 });
        if num_parents == 0 {
            // Degenerate input (max_parents == 0): leave the node orphaned,
            // the repair pass below attaches it.
            continue;
        }
        for parent in rand::seq::index::sample(&mut rng, available, num_parents) {
            let weight = rng.gen_range(MIN_EDGE_WEIGHT..=MAX_EDGE_WEIGHT);
            graph.add_edge(NodeIndex::new(parent), node, weight);
        }
    }

    attach_orphans(&mut graph, params.num_roots, &mut rng);
    link_components(&mut graph, &mut rng);
    assign_leaf_demand(&mut graph, params, &mut rng);

    Ok(graph)
}

/// Repair pass 1: give every non-root with in-degree 0 one random parent.
///
/// Candidate parents exclude the node itself and its descendants so the
/// repair can never introduce a cycle.
fn attach_orphans(graph: &mut BomGraph, num_roots: usize, rng: &mut StdRng) {
    let nodes: Vec<NodeIndex> = graph.node_indices().collect();
    for node in nodes {
        if node.index() < num_roots {
            continue;
        }
        if graph.neighbors_directed(node, Direction::Incoming).next().is_some() {
            continue;
        }

        let candidates: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&other| other != node && !has_path_connecting(&*graph, node, other, None))
            .collect();
        if candidates.is_empty() {
            continue;
        }
        let parent = candidates[rng.gen_range(0..candidates.len())];
        let weight = rng.gen_range(MIN_EDGE_WEIGHT..=MAX_EDGE_WEIGHT);
        graph.add_edge(parent, node, weight);
        debug!(orphan = node.index(), parent = parent.index(), "attached orphaned item");
    }
}

/// Repair pass 2: merge weakly-connected components into one.
///
/// Consecutive components are linked by an edge from the last node of one
/// to the first node of the next; when both components have more than one
/// node, a second random cross edge strengthens the link. All linking edges
/// run between previously disjoint components, so the graph stays acyclic.
fn link_components(graph: &mut BomGraph, rng: &mut StdRng) {
    let components = weak_components(graph);
    if components.len() <= 1 {
        return;
    }
    debug!(components = components.len(), "linking weakly-connected components");

    for pair in components.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        let src = first[first.len() - 1];
        let dst = second[0];
        let weight = rng.gen_range(MIN_EDGE_WEIGHT..=MAX_EDGE_WEIGHT);
        graph.add_edge(src, dst, weight);

        if first.len() > 1 && second.len() > 1 {
            let a = first[rng.gen_range(0..first.len())];
            let b = second[rng.gen_range(0..second.len())];
            let weight = rng.gen_range(MIN_EDGE_WEIGHT..=MAX_EDGE_WEIGHT);
            graph.add_edge(a, b, weight);
        }
    }
}

/// Weakly-connected components, each with members in ascending id order,
/// ordered by their smallest member id.
fn weak_components(graph: &BomGraph) -> Vec<Vec<NodeIndex>> {
    let mut sets = UnionFind::new(graph.node_count());
    for edge in graph.edge_references() {
        sets.union(edge.source().index(), edge.target().index());
    }

    let mut groups: std::collections::BTreeMap<usize, Vec<NodeIndex>> = std::collections::BTreeMap::new();
    for node in graph.node_indices() {
        groups.entry(sets.find(node.index())).or_default().push(node);
    }

    let mut components: Vec<Vec<NodeIndex>> = groups.into_values().collect();
    components.sort_by_key(|component| component[0]);
    components
}

/// Demand pass: uniform demand on the post-repair leaves, zero elsewhere.
///
/// Must run strictly after both repair passes since they can change which
/// nodes are leaves.
fn assign_leaf_demand(graph: &mut BomGraph, params: &BomParams, rng: &mut StdRng) {
    let leaves: Vec<NodeIndex> = graph.externals(Direction::Outgoing).collect();
    for node in leaves {
        graph[node].demand = rng.gen_range(params.min_demand..=params.max_demand);
    }
}

#[cfg(test)]
mod tests {
    use petgraph::algo::{
        connected_components,
        is_cyclic_directed,
    };
    use rstest::rstest;

    use super::*;

    /// Baseline parameters for structure tests.
    fn params(seed: u64) -> BomParams {
        BomParams {
            num_items: 24,
            num_roots: 3,
            max_depth: 3,
            max_parents: 2,
            min_demand: 10,
            max_demand: 100,
            seed,
        }
    }

    /// Flatten a graph into comparable (src, dst, weight) triples.
    fn edge_triples(graph: &BomGraph) -> Vec<(usize, usize, u32)> {
        graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), *e.weight()))
            .collect()
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(42)]
    #[case(987_654_321)]
    fn structural_invariants_hold(#[case] seed: u64) {
        let p = params(seed);
        let graph = build(&p).unwrap();

        assert_eq!(graph.node_count(), p.num_items);
        assert!(!is_cyclic_directed(&graph));
        assert_eq!(connected_components(&graph), 1, "graph must be weakly connected");

        for node in graph.node_indices() {
            let in_degree = graph.neighbors_directed(node, Direction::Incoming).count();
            if node.index() >= p.num_roots {
                assert!(in_degree >= 1, "non-root item {} has no parent", node.index());
            }
        }

        for edge in graph.edge_references() {
            assert!((MIN_EDGE_WEIGHT..=MAX_EDGE_WEIGHT).contains(edge.weight()));
        }
    }

    #[rstest]
    #[case(7)]
    #[case(42)]
    fn demand_is_positive_exactly_on_leaves(#[case] seed: u64) {
        let p = params(seed);
        let graph = build(&p).unwrap();

        for node in graph.node_indices() {
            let is_leaf = graph.neighbors_directed(node, Direction::Outgoing).next().is_none();
            let demand = graph[node].demand;
            if is_leaf {
                assert!(
                    (p.min_demand..=p.max_demand).contains(&demand),
                    "leaf {} demand {} out of bounds",
                    node.index(),
                    demand
                );
            } else {
                assert_eq!(demand, 0, "non-leaf {} must have zero demand", node.index());
            }
        }
    }

    #[test]
    fn zero_max_parents_is_repaired_into_a_connected_dag() {
        let p = BomParams { max_parents: 0, ..params(11) };
        let graph = build(&p).unwrap();

        assert!(!is_cyclic_directed(&graph));
        assert_eq!(connected_components(&graph), 1);
        for node in graph.node_indices().skip(p.num_roots) {
            assert!(graph.neighbors_directed(node, Direction::Incoming).count() >= 1);
        }
    }

    // Scenario: n=5, num_roots=2, max_parents=2, seed=42 reproduces the exact
    // same instance on every run.
    #[test]
    fn fixed_seed_reproduces_the_same_small_instance() {
        let p = BomParams {
            num_items: 5,
            num_roots: 2,
            max_depth: 3,
            max_parents: 2,
            min_demand: 10,
            max_demand: 100,
            seed: 42,
        };
        let first = build(&p).unwrap();
        let second = build(&p).unwrap();

        assert_eq!(edge_triples(&first), edge_triples(&second));
        let demands = |g: &BomGraph| g.node_indices().map(|n| g[n].demand).collect::<Vec<_>>();
        assert_eq!(demands(&first), demands(&second));
    }

    #[rstest]
    #[case(0)]
    #[case(42)]
    fn same_seed_same_graph_different_seed_different_graph(#[case] seed: u64) {
        let graph_a = build(&params(seed)).unwrap();
        let graph_b = build(&params(seed)).unwrap();
        let graph_c = build(&params(seed.wrapping_add(1))).unwrap();

        assert_eq!(edge_triples(&graph_a), edge_triples(&graph_b));
        // Not a hard guarantee, but a seed collision across adjacent seeds
        // would point at a broken RNG setup.
        assert_ne!(edge_triples(&graph_a), edge_triples(&graph_c));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(build(&BomParams { num_roots: 24, ..params(0) }).is_err());
        assert!(build(&BomParams { num_items: 0, num_roots: 0, ..params(0) }).is_err());
        assert!(build(&BomParams { min_demand: 50, max_demand: 10, ..params(0) }).is_err());
    }
}
