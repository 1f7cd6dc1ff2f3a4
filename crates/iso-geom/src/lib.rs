//! `iso-geom` — projections and the reachable-area hull.
//!
//! | Module         | Contents                                            |
//! |----------------|-----------------------------------------------------|
//! | [`projection`] | `Projection` trait, `Utm`, `Hemisphere`, `Identity` |
//! | [`hull`]       | `enclosing_polygon`                                 |
//! | [`error`]      | `GeomError`, `GeomResult<T>`                        |
//!
//! Polygons are `geo::Polygon<f64>` with `x = lon`, `y = lat`.

pub mod error;
pub mod hull;
pub mod projection;

#[cfg(test)]
mod tests;

pub use error::{GeomError, GeomResult};
pub use hull::{DISK_SEGMENTS, enclosing_polygon};
pub use projection::{Hemisphere, Identity, Projection, Utm};
