//! Delay injection: folding point-located junction delays into edge costs.
//!
//! Injection runs in two explicit phases:
//!
//! 1. **Resolve** — every [`DelayRecord`] is snapped to its nearest node.
//!    This phase reads only node positions, never edge state.  When several
//!    records land on the same node the record with the greatest peak volume
//!    wins (ties: smallest site id), so the outcome does not depend on the
//!    order records arrive in.  Winning records become node attributes;
//!    records without volumes default both volumes to 0.
//! 2. **Apply** — one deterministic pass over all nodes computes a delay with
//!    the caller's [`DelayModel`] and adds it to every incoming and every
//!    outgoing edge of the node.  An edge therefore accumulates the delays of
//!    both of its endpoints.  Delays are computed against the resolved
//!    attributes and checked before the network is written, so a failing
//!    model leaves node attributes and edge times as they were.
//!
//! Injection is not idempotent.  Each call adds delays again; the network
//! counts passes in [`Network::delay_passes`] and every pass after the first
//! is logged as a warning.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use log::{debug, warn};

use iso_core::{GeoPoint, NodeId};

use crate::network::{Network, NodeAttribute, NodeAttributes};
use crate::{NetworkError, NetworkResult};

// ── Records ───────────────────────────────────────────────────────────────────

/// Traffic volume counts for a delay site.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Volumes {
    pub offpeak: f64,
    pub peak:    f64,
}

/// A point-located delay source, e.g. a signalised intersection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DelayRecord {
    pub point:   GeoPoint,
    pub site_id: String,
    /// `None` when the site has no entry in the volume table.
    pub volumes: Option<Volumes>,
}

/// Where a delay record ended up.  One per accepted record, in input order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SiteMapping {
    pub site_id:  String,
    pub node:     NodeId,
    pub node_key: i64,
    /// Position of the node (not of the record).
    pub point:    GeoPoint,
}

// ── Policy ────────────────────────────────────────────────────────────────────

/// Which volume count drives the signalised delay.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VolumePeriod {
    #[default]
    Peak,
    Offpeak,
}

/// Delay at a node whose selected volume is positive.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SignalDelay {
    /// `min(cap, volume / divisor)`: grows with volume, never exceeds `cap`.
    Saturating { cap: f64, divisor: f64 },
    /// A fixed delay regardless of volume.
    Flat(f64),
}

/// Computes the per-node delay (seconds) from node attributes.
pub trait DelayModel {
    fn delay(&self, attrs: &NodeAttributes) -> f64;

    /// Reject parameter sets that could produce negative or non-finite delays.
    fn validate(&self) -> NetworkResult<()> {
        Ok(())
    }
}

/// The standard signalised/unsignalised delay policy.
///
/// The presets are worked examples, not calibrated defaults; real analyses
/// should pass their own values.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DelayPolicy {
    pub signalised: SignalDelay,
    /// Delay at every node without a positive volume.
    pub base_unsignalised_delay: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub period: VolumePeriod,
}

impl DelayPolicy {
    /// Driving preset: saturating at 120 s with divisor 200, 10 s elsewhere.
    pub fn driving() -> Self {
        Self {
            signalised: SignalDelay::Saturating { cap: 120.0, divisor: 200.0 },
            base_unsignalised_delay: 10.0,
            period: VolumePeriod::Peak,
        }
    }

    /// Walking preset: 30 s at signals, 5 s elsewhere.
    pub fn walking() -> Self {
        Self {
            signalised: SignalDelay::Flat(30.0),
            base_unsignalised_delay: 5.0,
            period: VolumePeriod::Peak,
        }
    }

    /// A policy that adds nothing anywhere.
    pub fn none() -> Self {
        Self {
            signalised: SignalDelay::Flat(0.0),
            base_unsignalised_delay: 0.0,
            period: VolumePeriod::Peak,
        }
    }

    fn volume(&self, attrs: &NodeAttributes) -> f64 {
        let v = match self.period {
            VolumePeriod::Peak    => attrs.peak_volume,
            VolumePeriod::Offpeak => attrs.offpeak_volume,
        };
        v.unwrap_or(0.0)
    }
}

impl DelayModel for DelayPolicy {
    fn delay(&self, attrs: &NodeAttributes) -> f64 {
        let volume = self.volume(attrs);
        if volume > 0.0 {
            match self.signalised {
                SignalDelay::Saturating { cap, divisor } => cap.min(volume / divisor),
                SignalDelay::Flat(d) => d,
            }
        } else {
            self.base_unsignalised_delay
        }
    }

    fn validate(&self) -> NetworkResult<()> {
        let non_negative = |name: &str, v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(NetworkError::InvalidPolicy(format!("{name} must be finite and >= 0, got {v}")))
            }
        };
        non_negative("base_unsignalised_delay", self.base_unsignalised_delay)?;
        match self.signalised {
            SignalDelay::Saturating { cap, divisor } => {
                non_negative("cap", cap)?;
                if !divisor.is_finite() || divisor <= 0.0 {
                    return Err(NetworkError::InvalidPolicy(format!(
                        "divisor must be finite and > 0, got {divisor}"
                    )));
                }
                Ok(())
            }
            SignalDelay::Flat(d) => non_negative("signalised delay", d),
        }
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Summary of one injection pass.
#[derive(Clone, Debug, Default)]
pub struct InjectionReport {
    pub mappings:         Vec<SiteMapping>,
    /// Records skipped because their coordinate was invalid.
    pub skipped_records:  usize,
    /// Nodes that received a delay record in this pass.
    pub site_nodes:       usize,
    /// Sum of all deltas added to edges, in seconds.
    pub total_delay:      f64,
    /// Value of `Network::delay_passes` after this pass.
    pub pass:             u32,
}

// ── Phase 1: resolve ──────────────────────────────────────────────────────────

/// Attribute update for one node, chosen from all records that snap to it.
#[derive(Clone, Debug)]
struct NodeUpdate {
    site_id: String,
    volumes: Volumes,
}

impl NodeUpdate {
    fn attributes(&self) -> [NodeAttribute; 3] {
        [
            NodeAttribute::SiteId(self.site_id.clone()),
            NodeAttribute::OffpeakVolume(self.volumes.offpeak),
            NodeAttribute::PeakVolume(self.volumes.peak),
        ]
    }

    /// `true` if `self` should replace `current` as the node's record.
    fn beats(&self, current: &NodeUpdate) -> bool {
        match self.volumes.peak.total_cmp(&current.volumes.peak) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => self.site_id < current.site_id,
        }
    }
}

fn resolve_records(
    network: &Network,
    records: &[DelayRecord],
) -> NetworkResult<(Vec<SiteMapping>, BTreeMap<NodeId, NodeUpdate>, usize)> {
    let mut mappings = Vec::with_capacity(records.len());
    let mut updates: BTreeMap<NodeId, NodeUpdate> = BTreeMap::new();
    let mut skipped = 0;

    for record in records {
        if !record.point.is_valid() {
            warn!("skipping delay record {:?}: invalid coordinate {}", record.site_id, record.point);
            skipped += 1;
            continue;
        }
        let node = network.nearest_node(record.point)?;
        mappings.push(SiteMapping {
            site_id:  record.site_id.clone(),
            node,
            node_key: network.node_key[node.index()],
            point:    network.node_pos[node.index()],
        });

        let candidate = NodeUpdate {
            site_id: record.site_id.clone(),
            volumes: record.volumes.unwrap_or_default(),
        };
        match updates.entry(node) {
            Entry::Occupied(mut slot) => {
                if candidate.beats(slot.get()) {
                    slot.insert(candidate);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
        }
    }

    Ok((mappings, updates, skipped))
}

// ── Phase 2: apply ────────────────────────────────────────────────────────────

/// Resolve `records` onto `network` and add per-node delays to every
/// incident edge.
///
/// Must be run exactly once per built network; see the module docs.
///
/// # Errors
///
/// - [`NetworkError::InvalidPolicy`] if `model.validate()` fails.
/// - [`NetworkError::EmptyNetwork`] if there are records but no nodes.
/// - [`NetworkError::NegativeDelta`] if the model yields a negative or
///   non-finite delay.  Checked for every node before anything is written,
///   so a failing call leaves node attributes and edge travel times unchanged.
pub fn inject_delays<M: DelayModel + ?Sized>(
    network: &mut Network,
    records: &[DelayRecord],
    model: &M,
) -> NetworkResult<InjectionReport> {
    model.validate()?;

    let (mappings, updates, skipped_records) = resolve_records(network, records)?;
    debug!(
        "resolved {} delay records onto {} nodes ({} skipped)",
        mappings.len(),
        updates.len(),
        skipped_records
    );

    let site_nodes = updates.len();

    // Compute every delay before mutating anything.
    let mut delays = Vec::with_capacity(network.node_count());
    for node in network.nodes() {
        let current = network.attributes(node).ok_or(NetworkError::UnknownNode(node))?;
        let delay = match updates.get(&node) {
            Some(update) => {
                let mut staged = current.clone();
                for attr in update.attributes() {
                    staged.set(attr);
                }
                model.delay(&staged)
            }
            None => model.delay(current),
        };
        if !delay.is_finite() || delay < 0.0 {
            let edge = network
                .incoming_edges(node)
                .chain(network.outgoing_edges(node))
                .next()
                .unwrap_or_default();
            return Err(NetworkError::NegativeDelta { edge, delta: delay });
        }
        delays.push(delay);
    }

    for (node, update) in updates {
        for attr in update.attributes() {
            network.add_node_attribute(node, attr)?;
        }
    }

    let mut total_delay = 0.0;
    for (i, &delay) in delays.iter().enumerate() {
        if delay == 0.0 {
            continue;
        }
        let node = NodeId(i as u32);
        let incident: Vec<_> = network
            .incoming_edges(node)
            .chain(network.outgoing_edges(node))
            .collect();
        for edge in incident {
            network.increment_edge_time(edge, delay)?;
            total_delay += delay;
        }
    }

    let pass = network.record_delay_pass();
    if pass > 1 {
        warn!(
            "delay injection pass {pass} on the same network: edge travel times now count junction delays {pass} times"
        );
    }
    debug!("injected {total_delay:.1} s of delay across {} nodes", delays.len());

    Ok(InjectionReport {
        mappings,
        skipped_records,
        site_nodes,
        total_delay,
        pass,
    })
}
