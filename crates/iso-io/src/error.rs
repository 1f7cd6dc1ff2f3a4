//! Error types for iso-io.

use thiserror::Error;

/// Errors raised while reading inputs or writing reports.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("OSM parse error: {0}")]
    Osm(String),
}

/// Alias for `Result<T, IoError>`.
pub type IoResult<T> = Result<T, IoError>;
