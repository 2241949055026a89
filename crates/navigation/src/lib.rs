//! Turn-by-turn guidance from live position, device heading, and a
//! chosen destination.

pub mod advisor;

pub use advisor::*;
