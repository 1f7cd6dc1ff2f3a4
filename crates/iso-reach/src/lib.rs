//! `iso-reach` — cutoff-bounded single-source reachability.
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`engine`] | `ReachabilityEngine` trait, `BoundedDijkstra`, `Reachability` |
//! | [`error`]  | `ReachError`, `ReachResult<T>`                             |

pub mod engine;
pub mod error;


pub use engine::{BoundedDijkstra, Reachability, ReachabilityEngine, reachable_within};
pub use error::{ReachError, ReachResult};
