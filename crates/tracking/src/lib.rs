//! GPS tracking pipeline: acquisition supervision, outlier rejection,
//! optional smoothing, and road-segment accumulation.

pub mod filter;
pub mod kalman;
pub mod source;
pub mod track;

pub use filter::*;
pub use kalman::*;
pub use source::*;
pub use track::*;
