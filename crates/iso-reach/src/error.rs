//! Reachability error type.

use thiserror::Error;

use iso_core::NodeId;

#[derive(Debug, Error)]
pub enum ReachError {
    #[error("origin {0} not found in network")]
    UnknownNode(NodeId),
}

pub type ReachResult<T> = Result<T, ReachError>;
