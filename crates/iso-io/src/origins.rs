//! Query origins: named points an isochrone is computed from.
//!
//! Either a CSV (`name,lon,lat`) or a GeoJSON `FeatureCollection` of any
//! geometry type; non-point features are reduced to their centroid, so
//! building footprints and site polygons work directly.
//!
//! Origins whose point is not a valid WGS-84 coordinate (NaN, out of range)
//! are skipped with a warning.

use std::io::Read;
use std::path::Path;

use geo::Centroid;
use geojson::GeoJson;
use log::warn;
use serde::Deserialize;

use iso_core::GeoPoint;

use crate::{IoError, IoResult};

#[derive(Clone, Debug, PartialEq)]
pub struct Origin {
    pub name:  String,
    pub point: GeoPoint,
}

#[derive(Deserialize)]
struct OriginRecord {
    name: String,
    lon:  f64,
    lat:  f64,
}

/// Load origins, choosing the format from the file extension
/// (`.geojson`/`.json` → GeoJSON, anything else → CSV).
pub fn load_origins(path: &Path) -> IoResult<Vec<Origin>> {
    let is_geojson = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("geojson") || e.eq_ignore_ascii_case("json"));
    if is_geojson {
        origins_from_geojson_str(&std::fs::read_to_string(path)?)
    } else {
        load_origins_reader(std::fs::File::open(path)?)
    }
}

pub fn load_origins_reader<R: Read>(reader: R) -> IoResult<Vec<Origin>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut origins = Vec::new();
    for result in csv_reader.deserialize::<OriginRecord>() {
        let row = result?;
        push_valid(&mut origins, row.name, GeoPoint::new(row.lon, row.lat));
    }
    Ok(origins)
}

fn push_valid(origins: &mut Vec<Origin>, name: String, point: GeoPoint) {
    if point.is_valid() {
        origins.push(Origin { name, point });
    } else {
        warn!("origin {name:?} has invalid coordinate {point}; skipped");
    }
}

/// Origins from GeoJSON features.  The name is the `name` property, else the
/// feature id, else `origin-<index>`.
pub fn origins_from_geojson_str(contents: &str) -> IoResult<Vec<Origin>> {
    let features = match contents.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err(IoError::Parse("origins must be GeoJSON features".into()));
        }
    };

    let mut origins = Vec::with_capacity(features.len());
    for (i, feature) in features.into_iter().enumerate() {
        let name = feature
            .property("name")
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .or_else(|| feature.id.as_ref().map(|id| match id {
                geojson::feature::Id::String(s) => s.clone(),
                geojson::feature::Id::Number(n) => n.to_string(),
            }))
            .unwrap_or_else(|| format!("origin-{i}"));

        let Some(geometry) = feature.geometry else {
            warn!("origin {name:?} has no geometry; skipped");
            continue;
        };
        let geometry = geo::Geometry::<f64>::try_from(geometry)?;
        match geometry.centroid() {
            Some(c) => push_valid(&mut origins, name, GeoPoint::new(c.x(), c.y())),
            None => warn!("origin {name:?} has an empty geometry; skipped"),
        }
    }
    Ok(origins)
}
