//! Raw topology handed over by the network-acquisition collaborator.
//!
//! A `Topology` is plain data: node keys with coordinates, and directed edges
//! that reference those keys.  Nothing is validated here; all structural
//! checks happen in [`Network::build`](crate::Network::build) so a loader can
//! stream records in without caring about order.

use std::collections::HashMap;

use iso_core::GeoPoint;

/// A node as delivered by the source (e.g. an OSM node id and position).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopologyNode {
    pub key: i64,
    pub point: GeoPoint,
}

/// A directed edge between two node keys.
///
/// `key` disambiguates parallel edges between the same ordered pair
/// (divided carriageways, duplicated ways).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopologyEdge {
    pub from:   i64,
    pub to:     i64,
    pub key:    u32,
    /// Length in metres.
    pub length: f64,
    /// Road/path classification (`highway=*` value), if known.
    pub class:  Option<String>,
}

/// Directed multigraph description, consumed by `Network::build`.
#[derive(Clone, Debug, Default)]
pub struct Topology {
    pub nodes: Vec<TopologyNode>,
    pub edges: Vec<TopologyEdge>,
    /// Next parallel key per ordered pair, maintained by [`Topology::add_edge`].
    next_key: HashMap<(i64, i64), u32>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for bulk loads.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:    Vec::with_capacity(nodes),
            edges:    Vec::with_capacity(edges),
            next_key: HashMap::with_capacity(edges),
        }
    }

    pub fn add_node(&mut self, key: i64, point: GeoPoint) {
        self.nodes.push(TopologyNode { key, point });
    }

    /// Add a **directed** edge.  The parallel key is the number of edges
    /// previously added through this method for the same ordered pair.
    pub fn add_edge(&mut self, from: i64, to: i64, length: f64, class: Option<&str>) {
        let slot = self.next_key.entry((from, to)).or_insert(0);
        let key = *slot;
        *slot += 1;
        self.edges.push(TopologyEdge {
            from,
            to,
            key,
            length,
            class: class.map(str::to_owned),
        });
    }

    /// Add a directed edge with an explicit parallel key.  Later
    /// [`Topology::add_edge`] calls for the same pair continue above it;
    /// earlier ones are not renumbered, so a clash surfaces as a duplicate
    /// key in [`Network::build`](crate::Network::build).
    pub fn add_keyed_edge(&mut self, from: i64, to: i64, key: u32, length: f64, class: Option<&str>) {
        let slot = self.next_key.entry((from, to)).or_insert(0);
        *slot = (*slot).max(key.saturating_add(1));
        self.edges.push(TopologyEdge {
            from,
            to,
            key,
            length,
            class: class.map(str::to_owned),
        });
    }

    /// Convenience: add edges in **both directions** for a two-way segment.
    pub fn add_road(&mut self, a: i64, b: i64, length: f64, class: Option<&str>) {
        self.add_edge(a, b, length, class);
        self.add_edge(b, a, length, class);
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.edges.len() }
}
