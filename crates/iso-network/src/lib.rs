//! `iso-network` — travel-time network, nearest-node lookup, delay injection.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`topology`] | `Topology` raw input (node keys, directed keyed edges)     |
//! | [`network`]  | `Network` (CSR both directions + attributes), `Edge`       |
//! | [`locator`]  | `nearest_node`, R-tree over a fixed planar frame           |
//! | [`delay`]    | `inject_delays`, `DelayPolicy`, `DelayModel`, `DelayRecord` |
//! | [`error`]    | `NetworkError`, `NetworkResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod delay;
pub mod error;
pub mod locator;
pub mod network;
pub mod topology;

#[cfg(test)]
mod tests;

pub use delay::{
    DelayModel, DelayPolicy, DelayRecord, InjectionReport, SignalDelay, SiteMapping, VolumePeriod,
    Volumes, inject_delays,
};
pub use error::{NetworkError, NetworkResult};
pub use locator::nearest_node;
pub use network::{AttributeKey, Edge, Network, NodeAttribute, NodeAttributes};
pub use topology::{Topology, TopologyEdge, TopologyNode};
