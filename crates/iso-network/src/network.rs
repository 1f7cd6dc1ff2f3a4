//! Travel-time network representation.
//!
//! # Data layout
//!
//! Nodes and edges live in arenas addressed by [`NodeId`] / [`EdgeId`].  The
//! graph uses **Compressed Sparse Row (CSR)** format twice, once per
//! direction.  Given a `NodeId n`, its outgoing edges are the contiguous
//! `EdgeId` range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! and its incoming edges are the `EdgeId`s stored in
//! `in_edges[ node_in_start[n] .. node_in_start[n+1] ]`.
//!
//! Edge arrays are sorted by `(from, to, key)` and indexed by `EdgeId`, so
//! Dijkstra's inner loop is a contiguous scan and edge numbering does not
//! depend on the order the topology was delivered in.
//!
//! # Mutability
//!
//! After [`Network::build`] only two things change: edge travel times (via
//! [`Network::increment_edge_time`], additive only) and node attributes (via
//! [`Network::add_node_attribute`]).  Everything else is fixed.

use std::collections::HashMap;

use log::debug;

use iso_core::{EdgeId, GeoPoint, NodeId, SpeedTable};

use crate::locator::NodeLocator;
use crate::topology::Topology;
use crate::{NetworkError, NetworkResult};

// ── Node attributes ───────────────────────────────────────────────────────────

/// Names of the per-node attributes the delay injector reads and writes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeKey {
    SiteId,
    OffpeakVolume,
    PeakVolume,
}

/// One attribute value, tagged with the key it belongs to.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeAttribute {
    SiteId(String),
    OffpeakVolume(f64),
    PeakVolume(f64),
}

impl NodeAttribute {
    pub fn key(&self) -> AttributeKey {
        match self {
            NodeAttribute::SiteId(_)        => AttributeKey::SiteId,
            NodeAttribute::OffpeakVolume(_) => AttributeKey::OffpeakVolume,
            NodeAttribute::PeakVolume(_)    => AttributeKey::PeakVolume,
        }
    }
}

/// Delay-source attributes attached to a node.  All `None` until the delay
/// injector resolves a record onto the node.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeAttributes {
    pub site_id:        Option<String>,
    pub offpeak_volume: Option<f64>,
    pub peak_volume:    Option<f64>,
}

impl NodeAttributes {
    pub fn set(&mut self, attr: NodeAttribute) {
        match attr {
            NodeAttribute::SiteId(s)        => self.site_id = Some(s),
            NodeAttribute::OffpeakVolume(v) => self.offpeak_volume = Some(v),
            NodeAttribute::PeakVolume(v)    => self.peak_volume = Some(v),
        }
    }

    pub fn get(&self, key: AttributeKey) -> Option<NodeAttribute> {
        match key {
            AttributeKey::SiteId        => self.site_id.clone().map(NodeAttribute::SiteId),
            AttributeKey::OffpeakVolume => self.offpeak_volume.map(NodeAttribute::OffpeakVolume),
            AttributeKey::PeakVolume    => self.peak_volume.map(NodeAttribute::PeakVolume),
        }
    }
}

// ── Edge view ─────────────────────────────────────────────────────────────────

/// Snapshot of one directed edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    pub id:          EdgeId,
    pub from:        NodeId,
    pub to:          NodeId,
    /// Parallel-edge key, unique per ordered `(from, to)` pair.
    pub key:         u32,
    /// Metres.
    pub length:      f64,
    /// Metres per second.
    pub speed:       f64,
    /// Seconds: `length / speed` plus any injected delay.
    pub travel_time: f64,
}

// ── Network ───────────────────────────────────────────────────────────────────

/// Directed travel-time multigraph in CSR format plus a spatial index for
/// nearest-node lookups.
///
/// Construct with [`Network::build`].
pub struct Network {
    // ── Node data (indexed by NodeId) ─────────────────────────────────────
    /// External key of each node, strictly ascending.
    pub node_key: Vec<i64>,

    /// Geographic position of each node.
    pub node_pos: Vec<GeoPoint>,

    node_attrs: Vec<NodeAttributes>,

    key_index: HashMap<i64, NodeId>,

    // ── CSR adjacency ─────────────────────────────────────────────────────
    /// Outgoing edges of node `n` are `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Incoming edges of node `n` are
    /// `in_edges[node_in_start[n] .. node_in_start[n+1]]`.
    pub node_in_start: Vec<u32>,
    pub in_edges: Vec<EdgeId>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_from:   Vec<NodeId>,
    pub edge_to:     Vec<NodeId>,
    pub edge_key:    Vec<u32>,
    pub edge_length: Vec<f64>,
    pub edge_speed:  Vec<f64>,
    pub edge_class:  Vec<Option<String>>,

    /// The only edge field that changes after build.  Kept private so every
    /// change goes through `increment_edge_time`.
    edge_travel_time: Vec<f64>,

    // ── Bookkeeping ───────────────────────────────────────────────────────
    delay_passes: u32,

    pub(crate) locator: NodeLocator,
}

impl Network {
    /// Build a network from a raw topology, assigning each edge a speed from
    /// `speeds` and `travel_time = length / speed`.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::MalformedTopology`] for duplicate node keys, invalid
    ///   coordinates, edges referencing unknown nodes, negative or non-finite
    ///   lengths, or duplicate `(from, to, key)` triples.
    /// - [`NetworkError::InvalidSpeed`] if a resolved speed is ≤ 0 or not finite.
    ///
    /// Time complexity: O(E log E + N log N).
    pub fn build(topology: &Topology, speeds: &SpeedTable) -> NetworkResult<Network> {
        // ── Nodes, sorted by external key ─────────────────────────────────
        let mut nodes: Vec<_> = topology.nodes.iter().collect();
        nodes.sort_unstable_by_key(|n| n.key);

        let node_count = nodes.len();
        if u32::try_from(node_count).is_err() {
            return Err(NetworkError::MalformedTopology(format!(
                "{node_count} nodes exceed the NodeId range"
            )));
        }

        let mut node_key = Vec::with_capacity(node_count);
        let mut node_pos = Vec::with_capacity(node_count);
        let mut key_index = HashMap::with_capacity(node_count);

        for (i, n) in nodes.iter().enumerate() {
            if !n.point.is_valid() {
                return Err(NetworkError::MalformedTopology(format!(
                    "node {} has invalid coordinate {}",
                    n.key, n.point
                )));
            }
            if key_index.insert(n.key, NodeId(i as u32)).is_some() {
                return Err(NetworkError::MalformedTopology(format!(
                    "duplicate node key {}",
                    n.key
                )));
            }
            node_key.push(n.key);
            node_pos.push(n.point);
        }

        // ── Edges: resolve endpoints, sort by (from, to, key) ─────────────
        let mut raw = Vec::with_capacity(topology.edges.len());
        for e in &topology.edges {
            let resolve = |k: i64| {
                key_index.get(&k).copied().ok_or_else(|| {
                    NetworkError::MalformedTopology(format!(
                        "edge {} -> {} references unknown node {k}",
                        e.from, e.to
                    ))
                })
            };
            let from = resolve(e.from)?;
            let to = resolve(e.to)?;
            if !e.length.is_finite() || e.length < 0.0 {
                return Err(NetworkError::MalformedTopology(format!(
                    "edge {} -> {} has invalid length {}",
                    e.from, e.to, e.length
                )));
            }
            raw.push((from, to, e));
        }
        raw.sort_unstable_by_key(|(from, to, e)| (*from, *to, e.key));

        if u32::try_from(raw.len()).is_err() {
            return Err(NetworkError::MalformedTopology(format!(
                "{} edges exceed the EdgeId range",
                raw.len()
            )));
        }
        if let Some(w) = raw
            .windows(2)
            .find(|w| (w[0].0, w[0].1, w[0].2.key) == (w[1].0, w[1].1, w[1].2.key))
        {
            return Err(NetworkError::MalformedTopology(format!(
                "duplicate edge {} -> {} with key {}",
                w[0].2.from, w[0].2.to, w[0].2.key
            )));
        }

        let edge_count = raw.len();
        let mut edge_from = Vec::with_capacity(edge_count);
        let mut edge_to = Vec::with_capacity(edge_count);
        let mut edge_key = Vec::with_capacity(edge_count);
        let mut edge_length = Vec::with_capacity(edge_count);
        let mut edge_speed = Vec::with_capacity(edge_count);
        let mut edge_class = Vec::with_capacity(edge_count);
        let mut edge_travel_time = Vec::with_capacity(edge_count);

        for (i, (from, to, e)) in raw.iter().enumerate() {
            let speed = speeds.speed_for(e.class.as_deref());
            if !speed.is_finite() || speed <= 0.0 {
                return Err(NetworkError::InvalidSpeed { edge: EdgeId(i as u32), speed });
            }
            edge_from.push(*from);
            edge_to.push(*to);
            edge_key.push(e.key);
            edge_length.push(e.length);
            edge_speed.push(speed);
            edge_class.push(e.class.clone());
            edge_travel_time.push(e.length / speed);
        }

        // ── Outgoing CSR row pointer ──────────────────────────────────────
        let mut node_out_start = vec![0u32; node_count + 1];
        for from in &edge_from {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        // ── Incoming CSR (counting sort by destination) ───────────────────
        let mut node_in_start = vec![0u32; node_count + 1];
        for to in &edge_to {
            node_in_start[to.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_in_start[i] += node_in_start[i - 1];
        }
        let mut cursor: Vec<u32> = node_in_start[..node_count].to_vec();
        let mut in_edges = vec![EdgeId::INVALID; edge_count];
        for (i, to) in edge_to.iter().enumerate() {
            let slot = &mut cursor[to.index()];
            in_edges[*slot as usize] = EdgeId(i as u32);
            *slot += 1;
        }

        let locator = NodeLocator::build(&node_pos);

        debug!(
            "built network: {} nodes, {} edges ({} parallel)",
            node_count,
            edge_count,
            edge_key.iter().filter(|&&k| k > 0).count()
        );

        Ok(Network {
            node_key,
            node_pos,
            node_attrs: vec![NodeAttributes::default(); node_count],
            key_index,
            node_out_start,
            node_in_start,
            in_edges,
            edge_from,
            edge_to,
            edge_key,
            edge_length,
            edge_speed,
            edge_class,
            edge_travel_time,
            delay_passes: 0,
            locator,
        })
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    #[inline]
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        edge.index() < self.edge_count()
    }

    /// Iterator over every `NodeId` in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.node_count() as u32).map(NodeId)
    }

    // ── Node lookups ──────────────────────────────────────────────────────

    pub fn node_point(&self, node: NodeId) -> Option<GeoPoint> {
        self.node_pos.get(node.index()).copied()
    }

    /// Resolve an external key (e.g. an OSM node id) to its `NodeId`.
    pub fn node_by_key(&self, key: i64) -> Option<NodeId> {
        self.key_index.get(&key).copied()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// This is a contiguous index range — no heap allocation.
    ///
    /// # Panics
    /// Panics if `node` does not belong to this network.
    #[inline]
    pub fn outgoing_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Iterator over the `EdgeId`s of all incoming edges to `node`.
    ///
    /// # Panics
    /// Panics if `node` does not belong to this network.
    #[inline]
    pub fn incoming_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_in_start[node.index()] as usize;
        let end   = self.node_in_start[node.index() + 1] as usize;
        self.in_edges[start..end].iter().copied()
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    #[inline]
    pub fn in_degree(&self, node: NodeId) -> usize {
        let start = self.node_in_start[node.index()] as usize;
        let end   = self.node_in_start[node.index() + 1] as usize;
        end - start
    }

    // ── Edge access ───────────────────────────────────────────────────────

    /// Current travel time of `edge` in seconds.  Hot path for routing.
    ///
    /// # Panics
    /// Panics if `edge` does not belong to this network.
    #[inline]
    pub fn travel_time(&self, edge: EdgeId) -> f64 {
        self.edge_travel_time[edge.index()]
    }

    pub fn edge(&self, edge: EdgeId) -> Option<Edge> {
        let i = edge.index();
        if i >= self.edge_count() {
            return None;
        }
        Some(Edge {
            id:          edge,
            from:        self.edge_from[i],
            to:          self.edge_to[i],
            key:         self.edge_key[i],
            length:      self.edge_length[i],
            speed:       self.edge_speed[i],
            travel_time: self.edge_travel_time[i],
        })
    }

    pub fn edge_class(&self, edge: EdgeId) -> Option<&str> {
        self.edge_class.get(edge.index()).and_then(|c| c.as_deref())
    }

    /// Sum of all edge travel times.  Used to detect repeated delay passes.
    pub fn total_travel_time(&self) -> f64 {
        self.edge_travel_time.iter().sum()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Add `delta` seconds to the travel time of `edge`.
    ///
    /// # Errors
    ///
    /// [`NetworkError::NegativeDelta`] if `delta` is negative or not finite;
    /// [`NetworkError::UnknownEdge`] if `edge` is out of range.
    pub fn increment_edge_time(&mut self, edge: EdgeId, delta: f64) -> NetworkResult<()> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(NetworkError::NegativeDelta { edge, delta });
        }
        let slot = self
            .edge_travel_time
            .get_mut(edge.index())
            .ok_or(NetworkError::UnknownEdge(edge))?;
        *slot += delta;
        Ok(())
    }

    pub fn add_node_attribute(&mut self, node: NodeId, attr: NodeAttribute) -> NetworkResult<()> {
        self.node_attrs
            .get_mut(node.index())
            .ok_or(NetworkError::UnknownNode(node))?
            .set(attr);
        Ok(())
    }

    pub fn get_node_attribute(&self, node: NodeId, key: AttributeKey) -> Option<NodeAttribute> {
        self.node_attrs.get(node.index()).and_then(|a| a.get(key))
    }

    pub fn attributes(&self, node: NodeId) -> Option<&NodeAttributes> {
        self.node_attrs.get(node.index())
    }

    // ── Delay bookkeeping ─────────────────────────────────────────────────

    /// Number of delay-injection passes applied so far.  Anything other than
    /// `1` on a network about to be queried means delays are missing or
    /// double-counted.
    pub fn delay_passes(&self) -> u32 {
        self.delay_passes
    }

    pub(crate) fn record_delay_pass(&mut self) -> u32 {
        self.delay_passes += 1;
        self.delay_passes
    }
}
