//! CSV topology loader.
//!
//! # CSV format
//!
//! Two files, one row per node and one row per directed edge:
//!
//! ```csv
//! node_id,lon,lat
//! 101,144.9580,-37.7990
//! 102,144.9601,-37.7991
//! ```
//!
//! ```csv
//! from,to,key,length,highway
//! 101,102,0,183.4,residential
//! 102,101,0,183.4,residential
//! 102,103,,95.0,
//! ```
//!
//! `key` and `highway` may be empty or absent.  A missing key is assigned the
//! next parallel-edge key above any seen so far for that node pair.  Rows are
//! read in file order, so an explicit key only affects the rows after it: an
//! explicit key equal to one already assigned to an earlier blank row is a
//! duplicate, and building the network rejects it.  Exports
//! of simplified graphs sometimes store a merged classification as a list
//! (`"['primary', 'secondary']"`); the first entry is used.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use iso_core::GeoPoint;
use iso_network::Topology;

use crate::{IoError, IoResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    node_id: i64,
    lon:     f64,
    lat:     f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from:    i64,
    to:      i64,
    #[serde(default)]
    key:     Option<u32>,
    length:  f64,
    #[serde(default)]
    highway: Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`Topology`] from a node CSV and an edge CSV.
pub fn load_topology_csv(nodes: &Path, edges: &Path) -> IoResult<Topology> {
    let nodes = std::fs::File::open(nodes)?;
    let edges = std::fs::File::open(edges)?;
    load_topology_readers(nodes, edges)
}

/// Like [`load_topology_csv`] but accepts any `Read` sources.
///
/// Validation of keys and endpoints is left to `Network::build`.
pub fn load_topology_readers<N: Read, E: Read>(nodes: N, edges: E) -> IoResult<Topology> {
    let mut topology = Topology::new();

    let mut node_reader = csv::Reader::from_reader(nodes);
    for result in node_reader.deserialize::<NodeRecord>() {
        let row = result?;
        topology.add_node(row.node_id, GeoPoint::new(row.lon, row.lat));
    }

    let mut edge_reader = csv::ReaderBuilder::new().flexible(true).from_reader(edges);
    for result in edge_reader.deserialize::<EdgeRecord>() {
        let row = result?;
        let class = row.highway.as_deref().and_then(primary_class);
        match row.key {
            Some(key) => topology.add_keyed_edge(row.from, row.to, key, row.length, class),
            None => topology.add_edge(row.from, row.to, row.length, class),
        }
    }

    if topology.nodes.is_empty() && !topology.edges.is_empty() {
        return Err(IoError::Parse("edge file given but node file is empty".into()));
    }

    Ok(topology)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// First class of a possibly list-valued `highway` field; `None` if blank.
pub(crate) fn primary_class(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);
    let first = inner
        .split(',')
        .next()?
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim();
    (!first.is_empty()).then_some(first)
}
