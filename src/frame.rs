//! # Stereo pairs
//!
//! A rectified left/right pair of grayscale images with matching dimensions.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::GrayImage;
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Borrowed view of a rectified stereo pair.
///
/// Construction checks that both images share the same width and height, so every algorithm
/// can index the right image with coordinates that are valid in the left one.
#[derive(Clone, Copy)]
pub struct StereoPair<'a> {
    left: &'a GrayImage,
    right: &'a GrayImage
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl<'a> StereoPair<'a> {
    pub fn new(left: &'a GrayImage, right: &'a GrayImage) -> Result<Self> {
        if left.dimensions() != right.dimensions() {
            return Err(Error::DimensionMismatch {
                left: left.dimensions(),
                right: right.dimensions()
            });
        }

        Ok(Self { left, right })
    }

    /// Number of columns in both images.
    pub fn width(&self) -> usize {
        self.left.width() as usize
    }

    /// Number of rows (scanlines) in both images.
    pub fn height(&self) -> usize {
        self.left.height() as usize
    }

    pub fn left(&self) -> &'a GrayImage {
        self.left
    }

    pub fn right(&self) -> &'a GrayImage {
        self.right
    }

    /// Intensity of the left image at the given row and column.
    #[inline]
    pub fn left_at(&self, row: usize, col: usize) -> u8 {
        self.left.as_raw()[row * self.width() + col]
    }

    /// Intensity of the right image at the given row and column.
    #[inline]
    pub fn right_at(&self, row: usize, col: usize) -> u8 {
        self.right.as_raw()[row * self.width() + col]
    }
}
