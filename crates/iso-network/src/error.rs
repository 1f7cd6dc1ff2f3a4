//! Network-subsystem error type.

use thiserror::Error;

use iso_core::{EdgeId, GeoPoint, NodeId};

/// Errors produced by `iso-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Structural inconsistency in the input topology.  Fatal for `build`.
    #[error("malformed topology: {0}")]
    MalformedTopology(String),

    #[error("edge {edge} resolved to invalid speed {speed}")]
    InvalidSpeed { edge: EdgeId, speed: f64 },

    #[error("refusing to add delta {delta} to edge {edge}: travel times only grow")]
    NegativeDelta { edge: EdgeId, delta: f64 },

    #[error("node {0} not found in network")]
    UnknownNode(NodeId),

    #[error("edge {0} not found in network")]
    UnknownEdge(EdgeId),

    #[error("network has no nodes")]
    EmptyNetwork,

    /// Query coordinate is non-finite or outside the WGS-84 range.
    #[error("invalid query point {0}")]
    InvalidPoint(GeoPoint),

    #[error("invalid delay policy: {0}")]
    InvalidPolicy(String),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
