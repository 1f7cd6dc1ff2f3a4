//! Default speed assignment by road classification.
//!
//! Speeds are stored in metres per second; `travel_time = length / speed`
//! then comes out in seconds when lengths are in metres.  Tables are usually
//! written in km/h (that is how road-class defaults are quoted), so
//! [`SpeedTable::from_kph`] does the conversion once at construction.

use std::collections::BTreeMap;

/// Conversion factor from km/h to m/s.
pub const KPH_TO_MPS: f64 = 1_000.0 / 3_600.0;

/// Per-class default speeds plus a fallback for unknown or missing classes.
///
/// Lookup order for a class `c`:
///
/// 1. exact match on `c`;
/// 2. `c` with a trailing `_link` removed (`motorway_link` → `motorway`);
/// 3. the fallback speed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedTable {
    pub by_class: BTreeMap<String, f64>,
    pub fallback: f64,
}

impl SpeedTable {
    /// A table with no class entries: every edge gets `fallback`.
    pub fn uniform(fallback: f64) -> Self {
        Self { by_class: BTreeMap::new(), fallback }
    }

    /// Builder-style insertion of one class speed (already in m/s).
    pub fn with_class(mut self, class: impl Into<String>, speed: f64) -> Self {
        self.by_class.insert(class.into(), speed);
        self
    }

    /// Build a table from km/h values.
    pub fn from_kph<'a, I>(classes: I, fallback_kph: f64) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        Self {
            by_class: classes
                .into_iter()
                .map(|(class, kph)| (class.to_owned(), kph * KPH_TO_MPS))
                .collect(),
            fallback: fallback_kph * KPH_TO_MPS,
        }
    }

    /// Resolve the speed for an edge classification.
    pub fn speed_for(&self, class: Option<&str>) -> f64 {
        let Some(class) = class else {
            return self.fallback;
        };
        if let Some(&speed) = self.by_class.get(class) {
            return speed;
        }
        class
            .strip_suffix("_link")
            .and_then(|base| self.by_class.get(base).copied())
            .unwrap_or(self.fallback)
    }
}
