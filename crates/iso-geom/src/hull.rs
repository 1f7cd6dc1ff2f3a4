//! Enclosing polygon of a reachable point set.
//!
//! Points are projected, optionally buffered, hulled in the plane and the
//! hull ring is projected back to lon/lat.  A disk of radius `r` is
//! approximated by a regular polygon with [`DISK_SEGMENTS`] vertices; the
//! convex hull of a union of disks is the hull of all their vertices, so no
//! polygon union is needed.

use std::f64::consts::TAU;

use geo::{Area, ConvexHull, Coord, LineString, Polygon};
use log::trace;

use iso_core::GeoPoint;

use crate::projection::Projection;
use crate::{GeomError, GeomResult};

/// Vertices per buffered point: 8 segments per quarter circle.
pub const DISK_SEGMENTS: usize = 32;

/// Convex polygon (lon/lat) around `points`, each buffered by
/// `buffer_radius` projected units (metres for UTM).
///
/// Returns `Ok(None)` when the hull input has fewer than three coordinates or
/// the hull has zero area (all points coincident or collinear).  With a
/// positive radius even a single point yields a polygon.  Points whose
/// projection is not finite are skipped.
///
/// # Errors
///
/// [`GeomError::InvalidBufferRadius`] for a negative or non-finite radius.
pub fn enclosing_polygon<P: Projection + ?Sized>(
    points: &[GeoPoint],
    projection: &P,
    buffer_radius: f64,
) -> GeomResult<Option<Polygon<f64>>> {
    if !buffer_radius.is_finite() || buffer_radius < 0.0 {
        return Err(GeomError::InvalidBufferRadius(buffer_radius));
    }

    let projected = points
        .iter()
        .map(|&p| projection.forward(p))
        .filter(|c| c.x.is_finite() && c.y.is_finite());

    let coords: Vec<Coord<f64>> = if buffer_radius > 0.0 {
        let offsets = disk_offsets(buffer_radius);
        projected
            .flat_map(|c| offsets.iter().map(move |o| Coord { x: c.x + o.x, y: c.y + o.y }))
            .collect()
    } else {
        projected.collect()
    };

    if coords.len() < 3 {
        return Ok(None);
    }

    let hull = LineString::new(coords).convex_hull();
    // A closed ring needs three distinct vertices plus the repeated first.
    if hull.exterior().0.len() < 4 || hull.unsigned_area() == 0.0 {
        trace!("degenerate hull over {} points", points.len());
        return Ok(None);
    }

    let ring: Vec<Coord<f64>> = hull
        .exterior()
        .coords()
        .map(|&c| {
            let p = projection.inverse(c);
            Coord { x: p.lon, y: p.lat }
        })
        .collect();

    Ok(Some(Polygon::new(LineString::new(ring), vec![])))
}

fn disk_offsets(radius: f64) -> [Coord<f64>; DISK_SEGMENTS] {
    std::array::from_fn(|i| {
        let theta = TAU * i as f64 / DISK_SEGMENTS as f64;
        Coord { x: radius * theta.cos(), y: radius * theta.sin() }
    })
}
