//! The frozen [`Session`] and its query surface.

use geo::Polygon;
use log::debug;

use iso_core::{GeoPoint, NodeId};
use iso_geom::{Projection, enclosing_polygon};
use iso_network::{InjectionReport, Network, SiteMapping};
use iso_reach::{BoundedDijkstra, Reachability, ReachabilityEngine};

use crate::{ModeProfile, SessionResult};

// ── Isochrone ─────────────────────────────────────────────────────────────────

/// Result of one query: where it started, what it reached, and the area.
#[derive(Debug, Clone)]
pub struct Isochrone {
    pub origin:       NodeId,
    pub reachability: Reachability,
    /// `None` when the reachable set is too small or degenerate to enclose.
    pub polygon:      Option<Polygon<f64>>,
}

impl Isochrone {
    pub fn cutoff(&self) -> f64 {
        self.reachability.cutoff()
    }

    pub fn reachable_nodes(&self) -> usize {
        self.reachability.len()
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// A built, delay-injected network plus everything needed to answer queries.
///
/// The network is only reachable through `&self`, so a session can be shared
/// across threads and queried concurrently.  Create via
/// [`SessionBuilder`][crate::SessionBuilder].
pub struct Session<E: ReachabilityEngine = BoundedDijkstra> {
    network:    Network,
    profile:    ModeProfile,
    projection: Box<dyn Projection>,
    engine:     E,
    report:     InjectionReport,
}

impl<E: ReachabilityEngine> Session<E> {
    pub(crate) fn new(
        network:    Network,
        profile:    ModeProfile,
        projection: Box<dyn Projection>,
        engine:     E,
        report:     InjectionReport,
    ) -> Self {
        Self { network, profile, projection, engine, report }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn profile(&self) -> &ModeProfile {
        &self.profile
    }

    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }

    /// Statistics of the build-time delay injection.
    pub fn injection_report(&self) -> &InjectionReport {
        &self.report
    }

    /// Which node each delay-source record was snapped to.
    pub fn site_mappings(&self) -> &[SiteMapping] {
        &self.report.mappings
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Snap `point` to the nearest node and compute its isochrone.
    pub fn query(&self, point: GeoPoint, cutoff: f64) -> SessionResult<Isochrone> {
        let origin = self.network.nearest_node(point)?;
        debug!("{point} snapped to {origin}");
        self.query_node(origin, cutoff)
    }

    /// Isochrone from a known node.
    pub fn query_node(&self, origin: NodeId, cutoff: f64) -> SessionResult<Isochrone> {
        let reachability = self.engine.reachable_within(&self.network, origin, cutoff)?;
        self.enclose(reachability)
    }

    /// One isochrone per cutoff from a single search at the largest cutoff.
    ///
    /// Results are returned in the order of `cutoffs`.
    pub fn query_rings(&self, point: GeoPoint, cutoffs: &[f64]) -> SessionResult<Vec<Isochrone>> {
        let Some(widest) = cutoffs.iter().copied().filter(|c| !c.is_nan()).reduce(f64::max) else {
            return Ok(Vec::new());
        };
        let origin = self.network.nearest_node(point)?;
        let outer = self.engine.reachable_within(&self.network, origin, widest)?;
        cutoffs
            .iter()
            .map(|&c| self.enclose(outer.within(c)))
            .collect()
    }

    /// [`Session::query`] for every point, in input order.
    ///
    /// Runs on Rayon's thread pool with the `parallel` feature.
    pub fn query_many(&self, points: &[GeoPoint], cutoff: f64) -> SessionResult<Vec<Isochrone>> {
        #[cfg(not(feature = "parallel"))]
        {
            points.iter().map(|&p| self.query(p, cutoff)).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            points.par_iter().map(|&p| self.query(p, cutoff)).collect()
        }
    }

    fn enclose(&self, reachability: Reachability) -> SessionResult<Isochrone> {
        let points = reachability.points(&self.network);
        let polygon = enclosing_polygon(
            &points,
            self.projection.as_ref(),
            self.profile.buffer_radius_m,
        )?;
        Ok(Isochrone { origin: reachability.origin(), reachability, polygon })
    }
}
