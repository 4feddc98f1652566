//! Zero-cost indexing for hot loops
//!
//! The gather pass indexes springs through the incidence table, whose entries
//! are validated when the topology is built. Debug builds keep the bounds
//! check so a corrupted table panics with a useful message; release builds
//! skip it.
//!
//! ```rust
//! use springweave_engine::fast;
//!
//! let forces = vec![0.5f32, 1.5, 2.5];
//! let f = *fast!(forces, [1]);
//! assert_eq!(f, 1.5);
//! ```

/// Bounds-checked in debug, `get_unchecked` in release.
///
/// Only use on indices whose validity is established outside the loop.
#[macro_export]
macro_rules! fast {
    ($slice:expr, [$index:expr]) => {{
        #[cfg(debug_assertions)]
        {
            &$slice[$index]
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe { $slice.get_unchecked($index) }
        }
    }};
}
