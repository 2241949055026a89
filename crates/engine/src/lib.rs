//! Integration facade: wires the tracking pipeline, asset layer,
//! viewport, navigation advisor, and document persistence into one
//! event-driven engine object.

pub mod engine;
pub mod snapshot;

pub use engine::*;
pub use snapshot::*;
