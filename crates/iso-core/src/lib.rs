//! `iso-core` — foundational types for the isochrone workspace.
//!
//! This crate is a dependency of every other `iso-*` crate.  It intentionally
//! has no `iso-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `NodeId`, `EdgeId`                                    |
//! | [`geo`]     | `GeoPoint`, haversine distance                        |
//! | [`mode`]    | `TravelMode` enum                                     |
//! | [`speed`]   | `SpeedTable`, km/h → m/s conversion                   |
//! | [`error`]   | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod mode;
pub mod speed;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{EdgeId, NodeId};
pub use mode::TravelMode;
pub use speed::{KPH_TO_MPS, SpeedTable};
