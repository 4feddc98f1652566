//! Particle and spring storage

mod ping_pong;
mod topology;

pub use ping_pong::PingPong;
pub use topology::{build_lattice, lattice_spring_count, Incidence, Spring, SpringTopology};
