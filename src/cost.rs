//! # Patch costs
//!
//! This module provides the dissimilarity measures used to compare a patch in the left image with
//! a patch in the right image. Every measure follows the same convention: the result is a
//! non-negative integer and lower means more similar, so the matchers never need to know which
//! measure they are driving.
//!
//! Both centres must lie at least `half` away from every image border. Callers guarantee this
//! through their iteration bounds, the measures themselves do not check it.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::error::*;
use crate::frame::StereoPair;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Fixed point scale applied to `1 - ncc` so that NCC can be reported as an integer cost.
pub const NCC_SCALE: f64 = 1_000_000.0;

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

pub trait PatchCost: Sync {
    /// Dissimilarity between the `(2 * half + 1)` square patch centred on `left` (row, col) in
    /// the left image and the one centred on `right` (row, col) in the right image.
    fn cost(
        &self,
        pair: &StereoPair,
        half: usize,
        left: (usize, usize),
        right: (usize, usize)
    ) -> u64;
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Sum of squared differences.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ssd;

/// Zero-mean normalised cross-correlation, reported as `(1 - ncc) * NCC_SCALE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ncc;

/// Cost measure selection as it appears in algorithm parameters.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CostFunction {
    Ssd,
    Ncc
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl PatchCost for Ssd {
    fn cost(
        &self,
        pair: &StereoPair,
        half: usize,
        left: (usize, usize),
        right: (usize, usize)
    ) -> u64 {
        let side = 2 * half + 1;
        let mut acc = 0u64;

        for u in 0..side {
            let l_row = left.0 + u - half;
            let r_row = right.0 + u - half;

            for v in 0..side {
                let diff = pair.left_at(l_row, left.1 + v - half) as i64
                    - pair.right_at(r_row, right.1 + v - half) as i64;
                acc += (diff * diff) as u64;
            }
        }

        acc
    }
}

impl PatchCost for Ncc {
    fn cost(
        &self,
        pair: &StereoPair,
        half: usize,
        left: (usize, usize),
        right: (usize, usize)
    ) -> u64 {
        let side = 2 * half + 1;
        let n = (side * side) as f64;

        let mut sum_l = 0.0f64;
        let mut sum_r = 0.0f64;
        let mut sum_ll = 0.0f64;
        let mut sum_rr = 0.0f64;
        let mut sum_lr = 0.0f64;

        for u in 0..side {
            for v in 0..side {
                let l = pair.left_at(left.0 + u - half, left.1 + v - half) as f64;
                let r = pair.right_at(right.0 + u - half, right.1 + v - half) as f64;
                sum_l += l;
                sum_r += r;
                sum_ll += l * l;
                sum_rr += r * r;
                sum_lr += l * r;
            }
        }

        let var_l = sum_ll - sum_l * sum_l / n;
        let var_r = sum_rr - sum_r * sum_r / n;

        // A flat patch has no defined correlation, treat it as neither similar nor dissimilar
        if var_l <= f64::EPSILON || var_r <= f64::EPSILON {
            return NCC_SCALE as u64;
        }

        let ncc = ((sum_lr - sum_l * sum_r / n) / (var_l * var_r).sqrt()).max(-1.0).min(1.0);

        ((1.0 - ncc) * NCC_SCALE).round() as u64
    }
}

impl Default for CostFunction {
    fn default() -> Self {
        CostFunction::Ssd
    }
}

impl PatchCost for CostFunction {
    #[inline]
    fn cost(
        &self,
        pair: &StereoPair,
        half: usize,
        left: (usize, usize),
        right: (usize, usize)
    ) -> u64 {
        match self {
            CostFunction::Ssd => Ssd.cost(pair, half, left, right),
            CostFunction::Ncc => Ncc.cost(pair, half, left, right)
        }
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Check that a kernel size describes a centred square patch.
///
/// Zero is accepted and leaves nothing to match. Even sizes have no centre pixel and are rejected.
pub fn check_kernel_size(kernel_size: usize) -> Result<()> {
    if kernel_size != 0 && kernel_size % 2 == 0 {
        return Err(Error::InvalidParams(format!(
            "kernel_size must be odd, got {}",
            kernel_size
        )));
    }

    Ok(())
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
