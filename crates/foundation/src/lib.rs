pub mod geo;
pub mod projection;

// Foundation crate: small, well-tested primitives only.
pub use geo::*;
pub use projection::*;
