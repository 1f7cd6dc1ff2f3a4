//! Road network from an OSM PBF extract (`osm` feature).
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use iso_core::TravelMode;
//! use iso_io::osm::load_topology_from_pbf;
//!
//! let topology = load_topology_from_pbf(Path::new("melbourne.osm.pbf"), TravelMode::Walk)?;
//! ```
//!
//! # What is loaded
//!
//! `highway=*` ways usable by the travel mode (see [`drivable`] and
//! [`walkable`]).  Each consecutive node pair of a way becomes an edge whose
//! length is the great-circle distance and whose class is the `highway` tag,
//! so the profile's speed table applies.  For driving, one-way roads add a
//! single directed edge; walking ignores `oneway`.
//!
//! Every way node is kept; the graph is not simplified to intersections.
//!
//! # Memory note
//!
//! Every OSM node position is held in a `HashMap<i64, GeoPoint>` during the
//! first pass (ways reference nodes by OSM id).  The map is dropped before
//! the topology is returned.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::debug;
use osmpbf::{Element, ElementReader};

use iso_core::{GeoPoint, TravelMode};
use iso_network::Topology;

use crate::{IoError, IoResult};

// ── Public entry point ────────────────────────────────────────────────────────

/// Load a [`Topology`] for `mode` from an OSM PBF file.  Node keys are OSM
/// node ids.
///
/// # Errors
///
/// [`IoError::Osm`] on parse errors.
pub fn load_topology_from_pbf(path: &Path, mode: TravelMode) -> IoResult<Topology> {
    // ── Phase 1: collect all OSM nodes + usable ways in one pass ──────────
    let reader = ElementReader::from_path(path).map_err(|e| IoError::Osm(e.to_string()))?;

    let mut all_nodes: HashMap<i64, GeoPoint> = HashMap::new();
    let mut ways: Vec<OsmWay> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lon(), n.lat()));
            }
            Element::DenseNode(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lon(), n.lat()));
            }
            Element::Way(w) => {
                // Collect tags eagerly so &str lifetimes don't escape the closure.
                let tags: Vec<(&str, &str)> = w.tags().collect();
                let Some(highway) = tag(&tags, "highway") else {
                    return;
                };
                let usable = match mode {
                    TravelMode::Drive => drivable(highway, &tags),
                    TravelMode::Walk  => walkable(highway, &tags),
                };
                if usable {
                    let direction = match mode {
                        TravelMode::Drive => oneway(highway, &tags),
                        TravelMode::Walk  => Oneway::No,
                    };
                    let mut refs: Vec<i64> = w.refs().collect();
                    if direction == Oneway::Reverse {
                        refs.reverse();
                    }
                    ways.push(OsmWay {
                        refs,
                        class:  highway.to_owned(),
                        oneway: direction != Oneway::No,
                    });
                }
            }
            _ => {}
        })
        .map_err(|e| IoError::Osm(e.to_string()))?;

    // ── Phase 2: keep only way-referenced nodes ───────────────────────────
    let way_node_ids: HashSet<i64> = ways.iter().flat_map(|w| w.refs.iter().copied()).collect();

    let mut topology = Topology::with_capacity(way_node_ids.len(), way_node_ids.len() * 2);
    for id in &way_node_ids {
        if let Some(&pos) = all_nodes.get(id) {
            topology.add_node(*id, pos);
        }
    }

    // ── Phase 3: edges from way node sequences ────────────────────────────
    for way in &ways {
        for window in way.refs.windows(2) {
            let (a, b) = (window[0], window[1]);
            if a == b {
                continue;
            }
            if let (Some(&pa), Some(&pb)) = (all_nodes.get(&a), all_nodes.get(&b)) {
                let length = pa.distance_m(pb);
                topology.add_edge(a, b, length, Some(&way.class));
                if !way.oneway {
                    topology.add_edge(b, a, length, Some(&way.class));
                }
            }
        }
    }

    debug!(
        "loaded {} {mode} ways: {} nodes, {} edges",
        ways.len(),
        topology.node_count(),
        topology.edge_count()
    );
    Ok(topology)
}

// ── Internal types ────────────────────────────────────────────────────────────

struct OsmWay {
    refs:   Vec<i64>,
    class:  String,
    oneway: bool,
}

// ── Tag helpers ───────────────────────────────────────────────────────────────

fn tag<'a>(tags: &[(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn is_excluded_by_construction(highway: &str) -> bool {
    matches!(
        highway,
        "abandoned" | "bus_guideway" | "construction" | "planned" | "platform"
            | "proposed" | "raceway" | "razed" | "no"
    )
}

/// Whether a way with this `highway` value and tags is open to cars.
pub fn drivable(highway: &str, tags: &[(&str, &str)]) -> bool {
    if is_excluded_by_construction(highway) {
        return false;
    }
    if matches!(
        highway,
        "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track"
            | "bridleway" | "corridor" | "elevator" | "escalator"
    ) {
        return false;
    }
    if highway == "service"
        && matches!(tag(tags, "service"), Some("parking_aisle" | "driveway" | "emergency_access"))
    {
        return false;
    }
    !matches!(tag(tags, "motor_vehicle"), Some("no"))
        && !matches!(tag(tags, "access"), Some("private" | "no"))
}

/// Whether a way with this `highway` value and tags is open to pedestrians.
pub fn walkable(highway: &str, tags: &[(&str, &str)]) -> bool {
    if is_excluded_by_construction(highway) {
        return false;
    }
    if matches!(highway, "motorway" | "motorway_link" | "cycleway" | "bus_guideway") {
        return false;
    }
    if matches!(tag(tags, "foot"), Some("no")) || matches!(tag(tags, "access"), Some("private" | "no")) {
        return false;
    }
    !matches!(tag(tags, "service"), Some("private"))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Oneway {
    No,
    /// Traffic follows the way's node order.
    Forward,
    /// `oneway=-1`: traffic runs against the node order.
    Reverse,
}

/// One-way handling for car traffic.
///
/// Motorways, motorway links and roundabouts are implicitly one-way.
pub(crate) fn oneway(highway: &str, tags: &[(&str, &str)]) -> Oneway {
    match tag(tags, "oneway") {
        Some("yes" | "1" | "true") => Oneway::Forward,
        Some("-1" | "reverse") => Oneway::Reverse,
        Some("no" | "0" | "false") => Oneway::No,
        _ if matches!(highway, "motorway" | "motorway_link")
            || tag(tags, "junction") == Some("roundabout") => Oneway::Forward,
        _ => Oneway::No,
    }
}
