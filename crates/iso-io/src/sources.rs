//! Delay-source loaders: signalised sites and their traffic volumes.
//!
//! # Traffic lights
//!
//! A GeoJSON `FeatureCollection` of `Point` features, each carrying a
//! `SITE_NO` property (string or number).  Features without a usable point or
//! site number are skipped with a warning.
//!
//! # Volume table
//!
//! ```csv
//! NB_SCATS_SITE,offpeak_volume,peak_volume
//! 4321,812,1640
//! 4322,120,
//! ```
//!
//! Blank volumes read as 0.  Site numbers are compared after normalising
//! integral floats (`"4321.0"` matches `4321`).

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use geojson::{GeoJson, JsonValue};
use log::{debug, warn};
use serde::Deserialize;

use iso_core::GeoPoint;
use iso_network::{DelayRecord, Volumes};

use crate::{IoError, IoResult};

// ── Traffic lights ────────────────────────────────────────────────────────────

/// One signalised site.
#[derive(Clone, Debug, PartialEq)]
pub struct TrafficLight {
    pub site_id: String,
    pub point:   GeoPoint,
}

pub fn load_traffic_lights(path: &Path) -> IoResult<Vec<TrafficLight>> {
    let contents = std::fs::read_to_string(path)?;
    traffic_lights_from_str(&contents)
}

/// Parse traffic lights from GeoJSON text.
pub fn traffic_lights_from_str(contents: &str) -> IoResult<Vec<TrafficLight>> {
    let collection = match contents.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) | GeoJson::Geometry(_) => {
            return Err(IoError::Parse(
                "traffic lights must be a FeatureCollection".into(),
            ));
        }
    };

    let mut lights = Vec::with_capacity(collection.features.len());
    for (i, feature) in collection.features.iter().enumerate() {
        let point = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::Point(pos)) if pos.len() >= 2 => GeoPoint::new(pos[0], pos[1]),
            _ => {
                warn!("traffic light feature {i} has no point geometry; skipped");
                continue;
            }
        };
        let Some(site_id) = feature.property("SITE_NO").and_then(site_id_from_json) else {
            warn!("traffic light feature {i} has no SITE_NO; skipped");
            continue;
        };
        lights.push(TrafficLight { site_id, point });
    }

    debug!("loaded {} traffic lights", lights.len());
    Ok(lights)
}

fn site_id_from_json(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(normalise_site_id(s)).filter(|s| !s.is_empty()),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Some(i.to_string()),
            None => n.as_f64().map(|f| normalise_site_id(&f.to_string())),
        },
        _ => None,
    }
}

/// `" 4321.0 "` → `"4321"`; anything non-integral is only trimmed.
pub(crate) fn normalise_site_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => trimmed.to_owned(),
    }
}

// ── Volumes ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct VolumeRecord {
    #[serde(rename = "NB_SCATS_SITE")]
    site:           String,
    #[serde(default)]
    offpeak_volume: Option<f64>,
    #[serde(default)]
    peak_volume:    Option<f64>,
}

/// Volumes keyed by normalised site number.
#[derive(Clone, Debug, Default)]
pub struct VolumeTable {
    by_site: HashMap<String, Volumes>,
}

impl VolumeTable {
    pub fn get(&self, site_id: &str) -> Option<Volumes> {
        self.by_site.get(&normalise_site_id(site_id)).copied()
    }

    pub fn insert(&mut self, site_id: &str, volumes: Volumes) {
        self.by_site.insert(normalise_site_id(site_id), volumes);
    }

    pub fn len(&self) -> usize {
        self.by_site.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_site.is_empty()
    }
}

pub fn load_volumes_csv(path: &Path) -> IoResult<VolumeTable> {
    let file = std::fs::File::open(path)?;
    load_volumes_reader(file)
}

/// Like [`load_volumes_csv`] but accepts any `Read` source.
///
/// # Errors
///
/// [`IoError::Parse`] if a site number appears twice.
pub fn load_volumes_reader<R: Read>(reader: R) -> IoResult<VolumeTable> {
    let mut table = VolumeTable::default();
    let mut csv_reader = csv::Reader::from_reader(reader);
    for result in csv_reader.deserialize::<VolumeRecord>() {
        let row = result?;
        let site = normalise_site_id(&row.site);
        let volumes = Volumes {
            offpeak: row.offpeak_volume.unwrap_or(0.0),
            peak:    row.peak_volume.unwrap_or(0.0),
        };
        if table.by_site.insert(site.clone(), volumes).is_some() {
            return Err(IoError::Parse(format!("duplicate volume row for site {site}")));
        }
    }
    Ok(table)
}

// ── Join ──────────────────────────────────────────────────────────────────────

/// One [`DelayRecord`] per light; sites missing from `volumes` get `None`.
pub fn join_volumes(lights: &[TrafficLight], volumes: &VolumeTable) -> Vec<DelayRecord> {
    let records: Vec<DelayRecord> = lights
        .iter()
        .map(|light| DelayRecord {
            point:   light.point,
            site_id: light.site_id.clone(),
            volumes: volumes.get(&light.site_id),
        })
        .collect();
    let matched = records.iter().filter(|r| r.volumes.is_some()).count();
    debug!("{matched} of {} traffic lights have volume counts", records.len());
    records
}
