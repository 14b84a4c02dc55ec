//! Typed `u32` indices for nodes, edges and drivers.
//!
//! Every id is `Copy + Ord + Hash`, so it works as a map key and sorts
//! deterministically.  The inner integer is `pub` for arena indexing; prefer
//! `.index()` at call sites.  Display is a one-letter prefix plus the index
//! (`n3`, `e7`, `d0`), which keeps log lines short.

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident, $prefix:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u32);

        impl $name {
            /// Sentinel for "no such id".
            pub const INVALID: $name = $name(u32::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// The `INVALID` sentinel.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($prefix, "{}"), self.0)
                } else {
                    f.write_str(concat!($prefix, "?"))
                }
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Slot in the graph's node arena.
    pub struct NodeId, "n";
}

typed_id! {
    /// Slot in the graph's edge arena.  Stable across removals of other
    /// edges.
    pub struct EdgeId, "e";
}

typed_id! {
    /// Position of a driver inside its `Demand`.  Identical drivers still get
    /// distinct ids.
    pub struct DriverId, "d";
}
