//! # Error standards
//!
//! This module provides a standardised error enum and result type for this crate.

// -----------------------------------------------------------------------------------------------
// TYPES
// -----------------------------------------------------------------------------------------------

/// Standard result type used in the disparity crate.
pub type Result<T> = std::result::Result<T, Error>;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Left image is {left:?} but right image is {right:?} (width, height)")]
    DimensionMismatch {
        left: (u32, u32),
        right: (u32, u32)
    },

    #[error("Invalid algorithm parameters: {0}")]
    InvalidParams(String),

    #[error("Could not parse parameters: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Could not read parameters file: {0}")]
    Io(#[from] std::io::Error)
}
