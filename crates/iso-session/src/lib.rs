//! `iso-session` — build the network once, answer many isochrone queries.
//!
//! # Lifecycle
//!
//! ```text
//! SessionBuilder::new(topology, profile)
//!   .delay_records(records)
//!   .build()            ① Network::build with the profile's speed table
//!                       ② inject_delays, exactly once
//!                       ③ freeze: the network is read-only from here on
//! session.query(point, cutoff)
//!   nearest_node → reachable_within → enclosing_polygon
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs `query_many` on Rayon's thread pool.              |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use iso_session::{ModeProfile, SessionBuilder};
//!
//! let session = SessionBuilder::new(topology, ModeProfile::drive())
//!     .delay_records(records)
//!     .build()?;
//! let iso = session.query(school, 240.0)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod session;


pub use builder::SessionBuilder;
pub use config::{DEFAULT_EPSG, InputPaths, IsochroneConfig, ModeProfile, OutputPaths, ProfileOverrides};
pub use error::{SessionError, SessionResult};
pub use session::{Isochrone, Session};
