//! # Disparity Computation
//!
//! This crate provides disparity map computation for rectified stereo pairs, using either
//! brute force block matching or dynamic programming along each scanline.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

mod disparity;
mod error;
mod frame;
pub mod block;
pub mod config;
pub mod cost;
pub mod scanline;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::cost::{CostFunction, PatchCost};
    pub use crate::disparity::{DisparityAlgorithm, DisparityMap};
    pub use crate::frame::StereoPair;
}
