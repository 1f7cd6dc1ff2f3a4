//! Reachability trait and default bounded Dijkstra implementation.
//!
//! # Pluggability
//!
//! The session calls reachability through the [`ReachabilityEngine`] trait,
//! so applications can swap in other label-setting searches (bucket queues,
//! contraction hierarchies) without touching the rest of the pipeline.
//!
//! # Cost units
//!
//! Costs are edge `travel_time` values, i.e. seconds.  The cutoff is
//! inclusive: a node at exactly `cutoff` is reachable.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use log::trace;

use iso_core::{GeoPoint, NodeId};
use iso_network::Network;

use crate::{ReachError, ReachResult};

// ── Reachability ──────────────────────────────────────────────────────────────

/// Cutoff-bounded distance labelling from a single origin.
///
/// Contains exactly the nodes whose shortest travel time from `origin` is
/// ≤ `cutoff`.  Holds no reference to the network it was computed on.
#[derive(Debug, Clone, PartialEq)]
pub struct Reachability {
    origin: NodeId,
    cutoff: f64,
    costs:  BTreeMap<NodeId, f64>,
}

impl Reachability {
    fn empty(origin: NodeId, cutoff: f64) -> Self {
        Self { origin, cutoff, costs: BTreeMap::new() }
    }

    pub fn origin(&self) -> NodeId {
        self.origin
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Shortest travel time to `node`, if it is within the cutoff.
    pub fn cost(&self, node: NodeId) -> Option<f64> {
        self.costs.get(&node).copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.costs.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// `(node, cost)` pairs in ascending `NodeId` order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.costs.iter().map(|(&n, &c)| (n, c))
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.costs.keys().copied()
    }

    /// Coordinates of every reachable node, in ascending `NodeId` order.
    pub fn points(&self, network: &Network) -> Vec<GeoPoint> {
        self.costs
            .keys()
            .filter_map(|&n| network.node_point(n))
            .collect()
    }

    /// Restrict to a smaller budget.  Equivalent to rerunning the search with
    /// `cutoff`, since shortest costs do not depend on the budget.
    pub fn within(&self, cutoff: f64) -> Reachability {
        if cutoff >= self.cutoff {
            return self.clone();
        }
        Reachability {
            origin: self.origin,
            cutoff,
            costs: self
                .costs
                .iter()
                .filter(|&(_, &c)| c <= cutoff)
                .map(|(&n, &c)| (n, c))
                .collect(),
        }
    }

    /// Largest cost in the result (0 for an origin-only result).
    pub fn max_cost(&self) -> Option<f64> {
        self.costs.values().copied().reduce(f64::max)
    }
}

// ── ReachabilityEngine trait ──────────────────────────────────────────────────

/// Pluggable reachability search.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so one engine can serve parallel
/// queries against a shared, frozen network.
pub trait ReachabilityEngine: Send + Sync {
    /// Label every node reachable from `origin` within `cutoff` seconds.
    ///
    /// Returns an empty result for a negative or NaN cutoff.
    fn reachable_within(
        &self,
        network: &Network,
        origin: NodeId,
        cutoff: f64,
    ) -> ReachResult<Reachability>;
}

// ── BoundedDijkstra ───────────────────────────────────────────────────────────

/// Label-setting Dijkstra with cutoff pruning.
///
/// Tentative labels above the cutoff are never pushed, so the frontier stops
/// at the budget instead of exhausting the graph.  Non-negative edge costs
/// (guaranteed by the network's additive-only mutation) make this exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedDijkstra;

impl ReachabilityEngine for BoundedDijkstra {
    fn reachable_within(
        &self,
        network: &Network,
        origin: NodeId,
        cutoff: f64,
    ) -> ReachResult<Reachability> {
        reachable_within(network, origin, cutoff)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: NodeId,
}

impl Eq for State {}

// Min-heap by cost, then by NodeId for deterministic tie-breaking.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Free-function form of [`BoundedDijkstra`].
///
/// # Errors
///
/// [`ReachError::UnknownNode`] if `origin` is not in `network`.
pub fn reachable_within(
    network: &Network,
    origin: NodeId,
    cutoff: f64,
) -> ReachResult<Reachability> {
    if !network.contains_node(origin) {
        return Err(ReachError::UnknownNode(origin));
    }
    if cutoff.is_nan() || cutoff < 0.0 {
        return Ok(Reachability::empty(origin, cutoff));
    }

    // dist[v] = best known cost to reach v; INFINITY for unreached nodes.
    let mut dist = vec![f64::INFINITY; network.node_count()];
    let mut settled = vec![false; network.node_count()];
    let mut costs = BTreeMap::new();

    dist[origin.index()] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(State { cost: 0.0, node: origin });

    while let Some(State { cost, node }) = heap.pop() {
        // Skip stale heap entries.
        if settled[node.index()] || cost > dist[node.index()] {
            continue;
        }
        settled[node.index()] = true;
        costs.insert(node, cost);

        for edge in network.outgoing_edges(node) {
            let next = network.edge_to[edge.index()];
            if settled[next.index()] {
                continue;
            }
            let next_cost = cost + network.travel_time(edge);
            if next_cost <= cutoff && next_cost < dist[next.index()] {
                dist[next.index()] = next_cost;
                heap.push(State { cost: next_cost, node: next });
            }
        }
    }

    trace!("reachability from {origin}: {} nodes within {cutoff} s", costs.len());
    Ok(Reachability { origin, cutoff, costs })
}
