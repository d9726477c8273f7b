//! # General disparity objects
//!
//! This module provides generic disparity traits and structures for use by different algorithms.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::GrayImage;
use crate::error::*;
use crate::frame::StereoPair;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// A generic integer disparity map, stored row-major.
///
/// Unset entries (borders, occluded pixels) hold zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DisparityMap {
    data: Vec<u32>,
    width: usize,
    height: usize,

    /// Largest non-zero disparity in the map, `None` when nothing was written.
    pub max_disp: Option<u32>,

    /// Smallest non-zero disparity in the map, `None` when nothing was written.
    ///
    /// Zero entries are indistinguishable from unset ones and are skipped, so this is never
    /// `Some(0)`, even when a block matcher pixel's best shift was 0.
    pub min_disp: Option<u32>
}

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

pub trait DisparityAlgorithm {
    /// Compute the disparity map of the given stereo pair.
    fn compute(&mut self, pair: &StereoPair) -> Result<DisparityMap>;
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl DisparityMap {
    pub fn new(width: usize, height: usize) -> Self {
        DisparityMap {
            data: vec![0; width * height],
            width,
            height,
            min_disp: None,
            max_disp: None
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.data[y * self.width + x]
    }

    pub fn put(&mut self, x: usize, y: usize, val: u32) {
        self.data[y * self.width + x] = val
    }

    /// The whole map as a row-major slice.
    pub fn as_raw(&self) -> &[u32] {
        &self.data
    }

    /// One scanline of the map.
    pub fn row(&self, y: usize) -> &[u32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// Largest value stored in the map, zero for an empty or unset map.
    pub fn max_value(&self) -> u32 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// True when no entry of the map has been written with a non-zero disparity.
    pub fn is_unset(&self) -> bool {
        self.data.iter().all(|&d| d == 0)
    }

    /// Record the range of non-zero disparities currently stored in the map.
    pub(crate) fn update_stats(&mut self) {
        let mut written = self.data.iter().copied().filter(|&d| d > 0);

        match written.next() {
            Some(first) => {
                let (min, max) = written.fold((first, first), |(min, max), d| {
                    (min.min(d), max.max(d))
                });
                self.min_disp = Some(min);
                self.max_disp = Some(max);
            },
            None => {
                self.min_disp = None;
                self.max_disp = None;
            }
        }
    }

    /// Converts the map into a Luma8 image, clamping values above 255.
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Luma([self.get(x as usize, y as usize).min(255) as u8])
        })
    }

    /// Converts the map to a normalised GrayImage.
    ///
    /// Normalises by the maximum observed disparity in the map. If the maximum disparity is not
    /// set then the function is equivalent to `.to_luma()`.
    pub fn to_luma_normalised(&self) -> GrayImage {
        let mult = match self.max_disp {
            Some(d) if d > 0 => 255.0 / d as f32,
            _ => 1.0
        };

        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let val = self.get(x as usize, y as usize) as f32 * mult;
            image::Luma([val.round().max(0.0).min(255.0) as u8])
        })
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
