//! `iso-io` — adapters between files and the isochrone pipeline.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`topology`] | `load_topology_csv`: `nodes.csv` + `edges.csv` → `Topology`   |
//! | [`sources`]  | Traffic-light GeoJSON, volume CSV, `join_volumes`             |
//! | [`origins`]  | Query origins from CSV or GeoJSON (centroids)                 |
//! | [`report`]   | Site-mapping CSV, isochrone GeoJSON                           |
//! | `osm`        | `load_topology_from_pbf` (feature `osm`)                      |
//! | [`error`]    | `IoError`, `IoResult<T>`                                      |
//!
//! # Feature flags
//!
//! | Flag  | Effect                                        |
//! |-------|-----------------------------------------------|
//! | `osm` | OSM PBF topology loading via `osmpbf`.        |

pub mod error;
pub mod origins;
pub mod report;
pub mod sources;
pub mod topology;

#[cfg(feature = "osm")]
pub mod osm;


pub use error::{IoError, IoResult};
pub use origins::{Origin, load_origins, load_origins_reader, origins_from_geojson_str};
pub use report::{
    IsochroneRow, SITE_MAPPING_HEADER, isochrones_feature_collection, write_isochrones,
    write_isochrones_geojson, write_site_mapping, write_site_mapping_csv,
};
pub use sources::{
    TrafficLight, VolumeTable, join_volumes, load_traffic_lights, load_volumes_csv,
    load_volumes_reader, traffic_lights_from_str,
};
pub use topology::{load_topology_csv, load_topology_readers};
