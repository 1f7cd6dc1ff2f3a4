//! Arena indices for the built network.
//!
//! A `NodeId` or `EdgeId` is only meaningful for the `Network` that issued
//! it.  External identifiers (OSM ids, CSV keys) stay `i64` keys on the
//! network and are never confused with these at the type level.

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            /// Placeholder for slots that are filled later in a build.
            pub const INVALID: $name = $name(u32::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

typed_id! {
    /// Index of a network node (intersection).
    ///
    /// Arena order follows the external node key, so comparing two `NodeId`s
    /// gives the same answer as comparing their source keys.
    NodeId
}

typed_id! {
    /// Index of a directed network edge, in `(from, to, key)` order.
    EdgeId
}
