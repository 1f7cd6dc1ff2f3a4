//! Fluent builder for constructing a [`Session`].

use log::{debug, info};

use iso_geom::{Projection, Utm};
use iso_network::{DelayRecord, Network, Topology, inject_delays};
use iso_reach::{BoundedDijkstra, ReachabilityEngine};

use crate::{ModeProfile, Session, SessionResult};

/// Fluent builder for [`Session<E>`].
///
/// # Required inputs
///
/// - [`Topology`] — raw nodes and directed edges
/// - [`ModeProfile`] — speeds, delay policy, projection, buffer
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                              |
/// |-----------------------|--------------------------------------|
/// | `.delay_records(v)`   | none: only unsignalised delays apply |
/// | `.projection(p)`      | `Utm::from_epsg(profile.epsg)`       |
/// | `.engine(e)`          | [`BoundedDijkstra`]                  |
///
/// # Example
///
/// ```rust,ignore
/// let session = SessionBuilder::new(topology, ModeProfile::walk())
///     .delay_records(records)
///     .build()?;
/// ```
pub struct SessionBuilder<E: ReachabilityEngine = BoundedDijkstra> {
    topology:   Topology,
    profile:    ModeProfile,
    records:    Vec<DelayRecord>,
    projection: Option<Box<dyn Projection>>,
    engine:     E,
}

impl SessionBuilder<BoundedDijkstra> {
    pub fn new(topology: Topology, profile: ModeProfile) -> Self {
        Self {
            topology,
            profile,
            records:    Vec::new(),
            projection: None,
            engine:     BoundedDijkstra,
        }
    }
}

impl<E: ReachabilityEngine> SessionBuilder<E> {
    /// Delay-source records to inject.  Replaces any earlier call.
    pub fn delay_records(mut self, records: Vec<DelayRecord>) -> Self {
        self.records = records;
        self
    }

    /// Override the hull projection derived from `profile.epsg`.
    pub fn projection<P: Projection + 'static>(mut self, projection: P) -> Self {
        self.projection = Some(Box::new(projection));
        self
    }

    /// Swap the reachability search.
    pub fn engine<E2: ReachabilityEngine>(self, engine: E2) -> SessionBuilder<E2> {
        SessionBuilder {
            topology:   self.topology,
            profile:    self.profile,
            records:    self.records,
            projection: self.projection,
            engine,
        }
    }

    /// Validate the profile, build the network, inject delays exactly once,
    /// and return a frozen [`Session`].
    pub fn build(self) -> SessionResult<Session<E>> {
        self.profile.validate()?;

        let projection: Box<dyn Projection> = match self.projection {
            Some(p) => p,
            None => Box::new(Utm::from_epsg(self.profile.epsg)?),
        };

        // ── Network ───────────────────────────────────────────────────────
        let mut network = Network::build(&self.topology, &self.profile.speed_table())?;

        // ── Delay injection (the only mutation a session ever makes) ─────
        let report = inject_delays(&mut network, &self.records, &self.profile.delay)?;
        debug!(
            "injected {:.1} s of delay over {} site nodes ({} records skipped)",
            report.total_delay, report.site_nodes, report.skipped_records,
        );

        info!(
            "{} session ready: {} nodes, {} edges",
            self.profile.mode,
            network.node_count(),
            network.edge_count(),
        );

        Ok(Session::new(network, self.profile, projection, self.engine, report))
    }
}
