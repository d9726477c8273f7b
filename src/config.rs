//! # Parameter files
//!
//! Algorithm parameters are plain `serde` structures, so they can be kept in TOML files next to
//! the data they were tuned on. For example a scanline matcher file looks like:
//!
//! ```toml
//! kernel_size = 5
//! occlusion_penalty = 10
//! cost = "ssd"
//! ```

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::*;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Parse algorithm parameters from a TOML string.
pub fn params_from_str<P: DeserializeOwned>(s: &str) -> Result<P> {
    Ok(toml::from_str(s)?)
}

/// Load algorithm parameters from a TOML file.
pub fn load_params<P: DeserializeOwned, T: AsRef<Path>>(path: T) -> Result<P> {
    let contents = std::fs::read_to_string(path)?;
    params_from_str(&contents)
}
