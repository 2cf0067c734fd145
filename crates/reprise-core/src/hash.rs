//! Hashers for generated widget IDs.
//!
//! Generated IDs have to agree between runs of the same session, so only
//! seedless hashers are allowed here.

#[cfg(feature = "std-hash")]
pub mod identity {
    pub use std::collections::hash_map::DefaultHasher as IdentityHasher;

    #[inline]
    pub fn new() -> IdentityHasher {
        IdentityHasher::new()
    }
}

#[cfg(not(feature = "std-hash"))]
pub mod identity {
    // fast branch
    pub use rustc_hash::FxHasher as IdentityHasher;

    #[inline]
    pub fn new() -> IdentityHasher {
        IdentityHasher::default()
    }
}
