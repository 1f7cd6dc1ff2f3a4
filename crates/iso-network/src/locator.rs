//! Nearest-node lookup.
//!
//! # Metric
//!
//! Distances are planar, not geodesic: every coordinate is mapped through a
//! fixed equirectangular projection
//!
//! ```text
//! x = lon · cos(φ₀),  y = lat
//! ```
//!
//! where `φ₀` is the mean latitude of the network's nodes, computed once at
//! build time.  Squared Euclidean distance in that frame ranks candidates the
//! same way as true distance to well under a metre at metropolitan scale,
//! and, because `φ₀` never changes, ranking (and therefore tie-breaking) is
//! reproducible for the life of the network.
//!
//! Exact ties go to the lowest `NodeId`.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use iso_core::{GeoPoint, NodeId};

use crate::network::Network;
use crate::{NetworkError, NetworkResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a projected `[x, y]` point plus its `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── NodeLocator ───────────────────────────────────────────────────────────────

pub(crate) struct NodeLocator {
    tree: RTree<NodeEntry>,
    /// `cos(φ₀)` for the fixed reference latitude.
    lon_scale: f64,
}

impl NodeLocator {
    /// Bulk-load the R-tree (O(N log N), faster than N inserts).
    pub(crate) fn build(positions: &[GeoPoint]) -> Self {
        let ref_lat = if positions.is_empty() {
            0.0
        } else {
            positions.iter().map(|p| p.lat).sum::<f64>() / positions.len() as f64
        };
        let lon_scale = ref_lat.to_radians().cos();

        let entries: Vec<NodeEntry> = positions
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: [pos.lon * lon_scale, pos.lat],
                id: NodeId(i as u32),
            })
            .collect();

        Self { tree: RTree::bulk_load(entries), lon_scale }
    }

    #[inline]
    fn project(&self, pos: GeoPoint) -> [f64; 2] {
        [pos.lon * self.lon_scale, pos.lat]
    }

    fn nearest(&self, pos: GeoPoint) -> Option<NodeId> {
        let mut iter = self.tree.nearest_neighbor_iter_with_distance_2(&self.project(pos));
        let (first, best) = iter.next()?;
        let tied = iter
            .take_while(|(_, d)| *d == best)
            .map(|(e, _)| e.id)
            .min();
        Some(tied.map_or(first.id, |t| t.min(first.id)))
    }

    fn k_nearest(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        if k == 0 {
            return Vec::new();
        }
        // Keep pulling past `k` while distances still tie with the k-th
        // candidate so the id tie-break sees every contender.
        let mut found: Vec<(f64, NodeId)> = Vec::with_capacity(k + 1);
        for (entry, d) in self.tree.nearest_neighbor_iter_with_distance_2(&self.project(pos)) {
            if found.len() >= k && d > found[k - 1].0 {
                break;
            }
            found.push((d, entry.id));
        }
        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        found.truncate(k);
        found.into_iter().map(|(_, id)| id).collect()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Return the node nearest to `point`.
///
/// # Errors
///
/// - [`NetworkError::InvalidPoint`] if `point` fails [`GeoPoint::is_valid`].
/// - [`NetworkError::EmptyNetwork`] if the network has no nodes.
pub fn nearest_node(network: &Network, point: GeoPoint) -> NetworkResult<NodeId> {
    if !point.is_valid() {
        return Err(NetworkError::InvalidPoint(point));
    }
    network.locator.nearest(point).ok_or(NetworkError::EmptyNetwork)
}

impl Network {
    /// Method form of [`nearest_node`].
    pub fn nearest_node(&self, point: GeoPoint) -> NetworkResult<NodeId> {
        nearest_node(self, point)
    }

    /// Return up to `k` nearest nodes to `point`, sorted by ascending
    /// distance, ties by ascending `NodeId`.  Empty for an invalid point.
    pub fn k_nearest_nodes(&self, point: GeoPoint, k: usize) -> Vec<NodeId> {
        if !point.is_valid() {
            return Vec::new();
        }
        self.locator.k_nearest(point, k)
    }
}
