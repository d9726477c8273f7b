//! # Block matching disparity computation
//!
//! This module provides a brute force block matcher. Every pixel is matched independently: the
//! patch around it in the left image is compared with patches in the right image shifted by each
//! candidate disparity in `0..max_shift`, and the cheapest shift wins.
//!
//! Unlike [`ScanlineDp`](crate::scanline::ScanlineDp) the stored value is not the raw shift but
//! `round(shift / max_shift * 255)`, which puts the map directly into display range.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use log::{debug, info, trace};
use rayon::prelude::*;
use serde::Deserialize;

use crate::cost::{check_kernel_size, CostFunction, PatchCost};
use crate::disparity::{DisparityAlgorithm, DisparityMap};
use crate::error::*;
use crate::frame::StereoPair;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct BlockMatcher {
    params: Params
}

#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Side of the square matching patch, odd.
    pub kernel_size: usize,

    /// Exclusive upper bound on the candidate shifts.
    pub max_shift: usize,

    #[serde(default)]
    pub cost: CostFunction,

    /// Match rows on the rayon thread pool.
    #[serde(default)]
    pub parallel: bool
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl BlockMatcher {
    /// Create a new instance of the algorithm with the given parameters.
    pub fn new(params: Params) -> Result<Self> {
        check_kernel_size(params.kernel_size)?;

        if params.max_shift == 0 {
            return Err(Error::InvalidParams(
                "max_shift must be at least 1".to_string()
            ));
        }

        Ok(Self { params })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    fn half(&self) -> usize {
        self.params.kernel_size / 2
    }

    /// The shift in `0..max_shift` minimising the patch cost at the given pixel.
    ///
    /// Ties go to the lowest shift. Shifts that would move the right patch past the left border
    /// are not candidates. Returns `None` for pixels within the kernel margin, or when no shift is
    /// a candidate.
    pub fn best_shift(&self, pair: &StereoPair, row: usize, col: usize) -> Option<usize> {
        let half = self.half();

        if self.params.kernel_size == 0
            || row < half
            || row + half >= pair.height()
            || col < half
            || col + half >= pair.width()
        {
            return None;
        }

        let num_candidates = self.params.max_shift.min(col - half + 1);

        (0..num_candidates)
            .map(|shift| (shift, self.params.cost.cost(pair, half, (row, col), (row, col - shift))))
            .fold(None, |best: Option<(usize, u64)>, (shift, cost)| match best {
                Some((_, best_cost)) if best_cost <= cost => best,
                _ => Some((shift, cost))
            })
            .map(|(shift, _)| shift)
    }

    /// Rescale a shift into the 0-255 display range.
    pub fn scale_shift(&self, shift: usize) -> u32 {
        (shift as f64 / self.params.max_shift as f64 * 255.0).round() as u32
    }

    fn match_row(&self, pair: &StereoPair, row: usize, out: &mut [u32]) {
        let half = self.half();

        trace!("Block matching row {}", row);

        for col in half..(pair.width() - half) {
            if let Some(shift) = self.best_shift(pair, row, col) {
                out[col] = self.scale_shift(shift);
            }
        }
    }
}

impl DisparityAlgorithm for BlockMatcher {
    /// Compute the disparity map for the given pair.
    fn compute(&mut self, pair: &StereoPair) -> Result<DisparityMap> {
        debug!("Computing block matching disparity with parameters: {:?}", self.params);

        let width = pair.width();
        let height = pair.height();
        let half = self.half();

        let mut disp_map = DisparityMap::new(width, height);

        if self.params.kernel_size == 0 || height <= 2 * half || width <= 2 * half {
            info!(
                "Kernel size {} leaves no pixels to match in a {}x{} pair",
                self.params.kernel_size, width, height
            );
            return Ok(disp_map);
        }

        let matcher = &*self;
        let rows = half..(height - half);
        let data = disp_map.data_mut();

        if self.params.parallel {
            data.par_chunks_mut(width)
                .enumerate()
                .filter(|(row, _)| rows.contains(row))
                .for_each(|(row, out)| matcher.match_row(pair, row, out));
        }
        else {
            data.chunks_mut(width)
                .enumerate()
                .filter(|(row, _)| rows.contains(row))
                .for_each(|(row, out)| matcher.match_row(pair, row, out));
        }

        disp_map.update_stats();

        info!(
            "Block matching complete, disparity range {:?}..{:?}",
            disp_map.min_disp, disp_map.max_disp
        );

        Ok(disp_map)
    }
}
