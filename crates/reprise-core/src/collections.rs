//! Hash collections keyed by widget ID and session-state key.
//!
//! Nothing here is iterated where order is observable; anything handed to a
//! client or compared in tests is sorted first.

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
}
