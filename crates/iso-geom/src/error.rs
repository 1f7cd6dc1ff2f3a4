//! Geometry error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeomError {
    #[error("invalid UTM zone {0} (expected 1..=60)")]
    InvalidZone(u8),

    #[error("EPSG:{0} is not a WGS-84 UTM zone")]
    UnsupportedEpsg(u32),

    #[error("buffer radius must be finite and >= 0, got {0}")]
    InvalidBufferRadius(f64),
}

pub type GeomResult<T> = Result<T, GeomError>;
