//! Core utilities shared by every engine variant

#[macro_use]
#[path = "utils/safety.rs"]
pub mod safety;
#[macro_use]
#[path = "utils/logging.rs"]
pub mod logging;

pub mod random;
pub mod vec2;

pub use random::SimRng;
pub use vec2::Vec2;
