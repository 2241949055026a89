//! Editor scene state: placed landmark assets with single selection and
//! drag/resize interaction, plus the canvas pan/zoom controller.

pub mod asset;
pub mod layer;
pub mod viewport;

pub use asset::*;
pub use layer::*;
pub use viewport::*;
