//! Mode profiles and the run configuration.
//!
//! A [`ModeProfile`] carries every tunable the pipeline uses for one travel
//! mode.  [`IsochroneConfig`] is the file-level configuration the CLI reads:
//! a mode, optional overrides of that mode's preset profile, cutoffs, and
//! input/output paths.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use iso_core::{SpeedTable, TravelMode};
use iso_network::{DelayModel, DelayPolicy};

use crate::{SessionError, SessionResult};

/// WGS-84 / UTM zone 55S (Melbourne).
pub const DEFAULT_EPSG: u32 = 32755;

// ── ModeProfile ───────────────────────────────────────────────────────────────

/// All per-mode parameters of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModeProfile {
    pub mode: TravelMode,

    /// Default speed per road class, km/h.
    #[serde(default)]
    pub speeds_kph: BTreeMap<String, f64>,

    /// Speed for unclassified edges and classes missing from `speeds_kph`.
    pub fallback_speed_kph: f64,

    pub delay: DelayPolicy,

    /// UTM zone used for hull construction.
    #[serde(default = "default_epsg")]
    pub epsg: u32,

    /// Metres each reachable node is buffered by before hulling.
    #[serde(default)]
    pub buffer_radius_m: f64,

    /// Cutoff used when a query does not name one.
    pub default_cutoff_secs: f64,
}

fn default_epsg() -> u32 {
    DEFAULT_EPSG
}

impl ModeProfile {
    /// Drive preset: road-class speeds, saturating signal delay, 4 min cutoff.
    pub fn drive() -> Self {
        let speeds = [
            ("motorway",    100.0),
            ("trunk",        80.0),
            ("primary",      60.0),
            ("secondary",    50.0),
            ("tertiary",     50.0),
            ("residential",  40.0),
            ("service",      20.0),
        ];
        Self {
            mode:                TravelMode::Drive,
            speeds_kph:          speeds.iter().map(|&(c, v)| (c.to_owned(), v)).collect(),
            fallback_speed_kph:  40.0,
            delay:               DelayPolicy::driving(),
            epsg:                DEFAULT_EPSG,
            buffer_radius_m:     0.0,
            default_cutoff_secs: 4.0 * 60.0,
        }
    }

    /// Walk preset: 5 km/h everywhere, flat signal delay, 150 m buffer,
    /// 10 min cutoff.
    pub fn walk() -> Self {
        Self {
            mode:                TravelMode::Walk,
            speeds_kph:          BTreeMap::new(),
            fallback_speed_kph:  5.0,
            delay:               DelayPolicy::walking(),
            epsg:                DEFAULT_EPSG,
            buffer_radius_m:     150.0,
            default_cutoff_secs: 10.0 * 60.0,
        }
    }

    pub fn for_mode(mode: TravelMode) -> Self {
        match mode {
            TravelMode::Drive => Self::drive(),
            TravelMode::Walk  => Self::walk(),
        }
    }

    /// Speed table in m/s for `Network::build`.
    pub fn speed_table(&self) -> SpeedTable {
        SpeedTable::from_kph(
            self.speeds_kph.iter().map(|(c, &v)| (c.as_str(), v)),
            self.fallback_speed_kph,
        )
    }

    /// Apply the `Some` fields of `overrides`.  Class speeds are merged into
    /// the existing table rather than replacing it.
    pub fn with_overrides(mut self, overrides: &ProfileOverrides) -> Self {
        if let Some(speeds) = &overrides.speeds_kph {
            self.speeds_kph.extend(speeds.iter().map(|(c, &v)| (c.clone(), v)));
        }
        if let Some(v) = overrides.fallback_speed_kph {
            self.fallback_speed_kph = v;
        }
        if let Some(d) = overrides.delay {
            self.delay = d;
        }
        if let Some(e) = overrides.epsg {
            self.epsg = e;
        }
        if let Some(r) = overrides.buffer_radius_m {
            self.buffer_radius_m = r;
        }
        if let Some(c) = overrides.default_cutoff_secs {
            self.default_cutoff_secs = c;
        }
        self
    }

    /// Reject speeds, radii, cutoffs and delay parameters the pipeline
    /// cannot use.
    pub fn validate(&self) -> SessionResult<()> {
        positive("fallback_speed_kph", self.fallback_speed_kph)?;
        for (class, &kph) in &self.speeds_kph {
            positive(&format!("speeds_kph.{class}"), kph)?;
        }
        non_negative("buffer_radius_m", self.buffer_radius_m)?;
        non_negative("default_cutoff_secs", self.default_cutoff_secs)?;
        self.delay.validate()?;
        Ok(())
    }
}

impl Default for ModeProfile {
    fn default() -> Self {
        Self::drive()
    }
}

/// Partial [`ModeProfile`] read from a config file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOverrides {
    pub speeds_kph:          Option<BTreeMap<String, f64>>,
    pub fallback_speed_kph:  Option<f64>,
    pub delay:               Option<DelayPolicy>,
    pub epsg:                Option<u32>,
    pub buffer_radius_m:     Option<f64>,
    pub default_cutoff_secs: Option<f64>,
}

fn positive(name: &str, v: f64) -> SessionResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(SessionError::Config(format!("{name} must be finite and > 0, got {v}")))
    }
}

fn non_negative(name: &str, v: f64) -> SessionResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(SessionError::Config(format!("{name} must be finite and >= 0, got {v}")))
    }
}

// ── IsochroneConfig ───────────────────────────────────────────────────────────

/// Where the network, delay sources and origins come from.
///
/// The network is read either from `pbf` or from the `nodes`/`edges` CSV pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputPaths {
    #[serde(default)]
    pub nodes:          Option<PathBuf>,
    #[serde(default)]
    pub edges:          Option<PathBuf>,
    #[serde(default)]
    pub pbf:            Option<PathBuf>,
    /// GeoJSON points with a `SITE_NO` property.
    #[serde(default)]
    pub traffic_lights: Option<PathBuf>,
    /// Per-site volume table.
    #[serde(default)]
    pub volumes:        Option<PathBuf>,
    pub origins:        PathBuf,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputPaths {
    pub isochrones:   PathBuf,
    #[serde(default)]
    pub site_mapping: Option<PathBuf>,
}

/// A complete analysis run.
///
/// ```toml
/// mode = "walk"
/// cutoffs_secs = [300, 600]
///
/// [profile]
/// buffer_radius_m = 100
///
/// [inputs]
/// nodes   = "data/nodes.csv"
/// edges   = "data/edges.csv"
/// origins = "data/schools.csv"
///
/// [outputs]
/// isochrones = "out/isochrones.geojson"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IsochroneConfig {
    #[serde(default)]
    pub mode: TravelMode,

    /// One ring per cutoff.  Empty means the profile's default cutoff.
    #[serde(default)]
    pub cutoffs_secs: Vec<f64>,

    #[serde(default)]
    pub profile: ProfileOverrides,

    pub inputs:  InputPaths,
    pub outputs: OutputPaths,
}

impl IsochroneConfig {
    /// The mode's preset with this config's overrides applied.
    pub fn profile(&self) -> ModeProfile {
        ModeProfile::for_mode(self.mode).with_overrides(&self.profile)
    }

    /// Cutoffs to compute, ascending and deduplicated.
    pub fn cutoffs(&self) -> Vec<f64> {
        let mut cutoffs = if self.cutoffs_secs.is_empty() {
            vec![self.profile().default_cutoff_secs]
        } else {
            self.cutoffs_secs.clone()
        };
        cutoffs.sort_by(f64::total_cmp);
        cutoffs.dedup();
        cutoffs
    }

    pub fn validate(&self) -> SessionResult<()> {
        self.profile().validate()?;
        for &c in &self.cutoffs_secs {
            non_negative("cutoffs_secs", c)?;
        }
        let csv_pair = self.inputs.nodes.is_some() && self.inputs.edges.is_some();
        if !csv_pair && self.inputs.pbf.is_none() {
            return Err(SessionError::Config(
                "inputs need either `pbf` or both `nodes` and `edges`".into(),
            ));
        }
        if self.inputs.volumes.is_some() && self.inputs.traffic_lights.is_none() {
            return Err(SessionError::Config(
                "`volumes` given without `traffic_lights`".into(),
            ));
        }
        Ok(())
    }
}
