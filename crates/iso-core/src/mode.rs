//! Travel mode enum shared by the loaders, the session profiles, and the CLI.
//!
//! The mode decides which road classes a loader keeps and which speed table
//! and delay policy a profile starts from.  It never changes the algorithms.

use std::str::FromStr;

use crate::CoreError;

/// How the isochrone is travelled.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TravelMode {
    /// Private vehicle over the drivable network.
    #[default]
    Drive,
    /// On foot over the walkable network.
    Walk,
}

impl TravelMode {
    /// Human-readable label, used for CSV/GeoJSON property values.
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Drive => "drive",
            TravelMode::Walk  => "walk",
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drive" | "car" => Ok(TravelMode::Drive),
            "walk" | "foot" => Ok(TravelMode::Walk),
            other => Err(CoreError::Parse(format!(
                "unknown travel mode {other:?}: expected \"drive\" or \"walk\""
            ))),
        }
    }
}
