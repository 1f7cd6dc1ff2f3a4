//! Forward/inverse coordinate projections.
//!
//! The hull is computed in a metric plane so that buffer radii are metres
//! and the convex hull is not distorted by longitude convergence.  [`Utm`]
//! is the transverse Mercator zone projection on WGS-84 using the Krüger
//! series to third order in `n` (sub-millimetre within a zone).

use std::f64::consts::PI;

use geo::Coord;

use iso_core::GeoPoint;

use crate::{GeomError, GeomResult};

/// Maps WGS-84 lon/lat to a planar frame and back.
pub trait Projection: Send + Sync {
    fn forward(&self, point: GeoPoint) -> Coord<f64>;
    fn inverse(&self, coord: Coord<f64>) -> GeoPoint;
}

// ── Identity ──────────────────────────────────────────────────────────────────

/// Treats lon/lat as planar `x`/`y`.  For data that is already projected,
/// or for tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity;

impl Projection for Identity {
    fn forward(&self, point: GeoPoint) -> Coord<f64> {
        Coord { x: point.lon, y: point.lat }
    }

    fn inverse(&self, coord: Coord<f64>) -> GeoPoint {
        GeoPoint::new(coord.x, coord.y)
    }
}

// ── UTM ───────────────────────────────────────────────────────────────────────

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Hemisphere {
    North,
    South,
}

/// One UTM zone.  Construct with [`Utm::new`] or [`Utm::from_epsg`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Utm {
    zone:       u8,
    hemisphere: Hemisphere,
    /// Central meridian, radians.
    lambda0:    f64,
    n:          f64,
    /// `k0 · A`, the scaled rectifying radius.
    k0a:        f64,
    alpha:      [f64; 3],
    beta:       [f64; 3],
    delta:      [f64; 3],
}

impl Utm {
    pub fn new(zone: u8, hemisphere: Hemisphere) -> GeomResult<Utm> {
        if !(1..=60).contains(&zone) {
            return Err(GeomError::InvalidZone(zone));
        }
        let n = WGS84_F / (2.0 - WGS84_F);
        let (n2, n3, n4) = (n * n, n * n * n, n * n * n * n);
        let a = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0);

        Ok(Utm {
            zone,
            hemisphere,
            lambda0: (f64::from(zone) * 6.0 - 183.0).to_radians(),
            n,
            k0a: K0 * a,
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        })
    }

    /// `326zz` → zone `zz` north, `327zz` → zone `zz` south.
    pub fn from_epsg(code: u32) -> GeomResult<Utm> {
        let hemisphere = match code / 100 {
            326 => Hemisphere::North,
            327 => Hemisphere::South,
            _ => return Err(GeomError::UnsupportedEpsg(code)),
        };
        let zone = u8::try_from(code % 100).map_err(|_| GeomError::UnsupportedEpsg(code))?;
        Utm::new(zone, hemisphere)
    }

    /// Zone containing `point` (no Norway/Svalbard exceptions).
    pub fn for_point(point: GeoPoint) -> GeomResult<Utm> {
        let zone = (((point.lon + 180.0) / 6.0).floor() as i64).rem_euclid(60) + 1;
        let hemisphere = if point.lat < 0.0 { Hemisphere::South } else { Hemisphere::North };
        Utm::new(zone as u8, hemisphere)
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    pub fn epsg(&self) -> u32 {
        let base = match self.hemisphere {
            Hemisphere::North => 32600,
            Hemisphere::South => 32700,
        };
        base + u32::from(self.zone)
    }

    /// Central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        self.lambda0.to_degrees()
    }

    fn false_northing(&self) -> f64 {
        match self.hemisphere {
            Hemisphere::North => 0.0,
            Hemisphere::South => FALSE_NORTHING_SOUTH,
        }
    }
}

impl Projection for Utm {
    fn forward(&self, point: GeoPoint) -> Coord<f64> {
        let phi = point.lat.to_radians();
        let mut dl = point.lon.to_radians() - self.lambda0;
        // Wrap across the antimeridian.
        if dl > PI {
            dl -= 2.0 * PI;
        } else if dl < -PI {
            dl += 2.0 * PI;
        }

        let c = 2.0 * self.n.sqrt() / (1.0 + self.n);
        let s = phi.sin();
        let t = (s.atanh() - c * (c * s).atanh()).sinh();
        let xi = t.atan2(dl.cos());
        let eta = (dl.sin() / (1.0 + t * t).sqrt()).atanh();

        let (mut e, mut n) = (eta, xi);
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            e += a * (k * xi).cos() * (k * eta).sinh();
            n += a * (k * xi).sin() * (k * eta).cosh();
        }

        Coord {
            x: FALSE_EASTING + self.k0a * e,
            y: self.false_northing() + self.k0a * n,
        }
    }

    fn inverse(&self, coord: Coord<f64>) -> GeoPoint {
        let xi = (coord.y - self.false_northing()) / self.k0a;
        let eta = (coord.x - FALSE_EASTING) / self.k0a;

        let (mut xp, mut ep) = (xi, eta);
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xp -= b * (k * xi).sin() * (k * eta).cosh();
            ep -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xp.sin() / ep.cosh()).asin();
        let mut phi = chi;
        for (j, d) in self.delta.iter().enumerate() {
            phi += d * (2.0 * (j + 1) as f64 * chi).sin();
        }
        let lambda = self.lambda0 + ep.sinh().atan2(xp.cos());

        GeoPoint::new(lambda.to_degrees(), phi.to_degrees())
    }
}
