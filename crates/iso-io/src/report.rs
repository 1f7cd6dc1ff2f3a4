//! Report writers: site-to-node mapping CSV and isochrone GeoJSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use geo::Polygon;
use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};

use iso_core::TravelMode;
use iso_network::SiteMapping;

use crate::IoResult;

// ── Site mapping ──────────────────────────────────────────────────────────────

/// Column order of the site mapping report.
pub const SITE_MAPPING_HEADER: [&str; 4] = ["site_no", "node_id", "node_lon", "node_lat"];

/// Write one row per mapping: the site number, the external key of the node
/// it snapped to, and that node's position.
pub fn write_site_mapping_csv(path: &Path, mappings: &[SiteMapping]) -> IoResult<()> {
    write_site_mapping(File::create(path)?, mappings)
}

pub fn write_site_mapping<W: Write>(writer: W, mappings: &[SiteMapping]) -> IoResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(SITE_MAPPING_HEADER)?;
    for m in mappings {
        csv_writer.write_record(&[
            m.site_id.clone(),
            m.node_key.to_string(),
            m.point.lon.to_string(),
            m.point.lat.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

// ── Isochrones ────────────────────────────────────────────────────────────────

/// One isochrone as written to the report.
#[derive(Debug, Clone, PartialEq)]
pub struct IsochroneRow {
    pub name:            String,
    /// External key of the origin node.
    pub node_id:         i64,
    pub mode:            TravelMode,
    pub cutoff_secs:     f64,
    pub reachable_nodes: usize,
    pub polygon:         Option<Polygon<f64>>,
}

impl IsochroneRow {
    /// GeoJSON feature; a missing polygon becomes a `null` geometry.
    pub fn to_feature(&self) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("name".into(), JsonValue::from(self.name.clone()));
        properties.insert("node_id".into(), JsonValue::from(self.node_id));
        properties.insert("reachable_nodes".into(), JsonValue::from(self.reachable_nodes));
        properties.insert("cutoff_secs".into(), JsonValue::from(self.cutoff_secs));
        properties.insert("mode".into(), JsonValue::from(self.mode.as_str()));

        Feature {
            bbox:            None,
            geometry:        self.polygon.as_ref().map(geojson::Geometry::from),
            id:              None,
            properties:      Some(properties),
            foreign_members: None,
        }
    }
}

pub fn isochrones_feature_collection(rows: &[IsochroneRow]) -> FeatureCollection {
    FeatureCollection {
        bbox:            None,
        features:        rows.iter().map(IsochroneRow::to_feature).collect(),
        foreign_members: None,
    }
}

pub fn write_isochrones_geojson(path: &Path, rows: &[IsochroneRow]) -> IoResult<()> {
    write_isochrones(BufWriter::new(File::create(path)?), rows)
}

pub fn write_isochrones<W: Write>(mut writer: W, rows: &[IsochroneRow]) -> IoResult<()> {
    serde_json::to_writer(&mut writer, &isochrones_feature_collection(rows))?;
    writer.flush()?;
    Ok(())
}
