//! # Scanline dynamic programming disparity computation
//!
//! Each epipolar line is solved on its own. For a line every left column is compared with every
//! right column, giving a square dissimilarity matrix. A minimum cost monotonic path through that
//! matrix is then found by dynamic programming, where each step is one of:
//!
//! - `Diagonal`: left column `r` is matched with right column `c`,
//! - `Left`: right column `c` has no partner in the left line,
//! - `Up`: left column `r` has no partner in the right line.
//!
//! The first row and column of the cost table are a linear ramp of the occlusion penalty, the cost
//! of leaving everything before that point unmatched. Walking the recorded moves back from the
//! bottom right corner gives the disparity `|r - c|` of every matched left column. Columns crossed
//! by an occlusion step are left unset.

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

pub struct ScanlineDp {
    params: Params
}

#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Side of the square matching patch, odd.
    pub kernel_size: usize,

    /// Cost of declaring a column occluded. Higher values favour matched (diagonal) steps.
    pub occlusion_penalty: u64,

    #[serde(default)]
    pub cost: CostFunction,

    /// Solve scanlines on the rayon thread pool. Tables are reused across the rows of each rayon
    /// job.
    #[serde(default)]
    pub parallel: bool
}

/// Working tables for a single scanline.
///
/// The tables are allocated once and overwritten by every scanline they are used for, so one
/// instance can be carried across all the rows of a sequential pass or of a rayon job.
pub struct ScanlineTables {
    /// Number of columns in the scanline.
    size: usize,

    half: usize,

    /// `size x size`, indexed by (left column, right column).
    dissimilarity: Vec<u64>,

    /// `(size + 1) x (size + 1)`, shifted by one so the boundary at `half - 1` exists for
    /// `half == 0`.
    dp: Vec<u64>,

    /// `size x size`, `None` outside the interior.
    moves: Vec<Option<Move>>
}

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Predecessor of a cell on the minimum cost path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// From `(r - 1, c - 1)`, a match between left column `r` and right column `c`.
    Diagonal,

    /// From `(r, c - 1)`, right column `c` is occluded.
    Left,

    /// From `(r - 1, c)`, left column `r` is occluded.
    Up
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl ScanlineDp {
    /// Create a new instance of the algorithm with the given parameters.
    pub fn new(params: Params) -> Result<Self> {
        check_kernel_size(params.kernel_size)?;

        Ok(Self { params })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    fn half(&self) -> usize {
        self.params.kernel_size / 2
    }

    /// Allocate tables sized for scanlines of the given pair.
    pub fn tables_for(&self, pair: &StereoPair) -> ScanlineTables {
        ScanlineTables::new(pair.width(), self.half())
    }

    /// Solve one scanline, writing disparities of matched columns into `out`.
    ///
    /// `out` must be the scanline's row of the output map: `pair.width()` long. Entries of
    /// unmatched columns are left untouched.
    pub fn match_scanline(
        &self,
        pair: &StereoPair,
        row: usize,
        tables: &mut ScanlineTables,
        out: &mut [u32]
    ) -> Result<()> {
        if tables.size != pair.width() || tables.half != self.half() {
            return Err(Error::InvalidParams(format!(
                "tables are sized for {} columns with half kernel {}, the pair needs {} and {}",
                tables.size, tables.half, pair.width(), self.half()
            )));
        }
        if out.len() != pair.width() {
            return Err(Error::InvalidParams(format!(
                "output scanline has {} entries but the pair has {} columns",
                out.len(), pair.width()
            )));
        }
        if row >= pair.height() {
            return Err(Error::InvalidParams(format!(
                "row {} is outside a pair of height {}",
                row, pair.height()
            )));
        }

        if self.params.kernel_size == 0 || !tables.has_interior() {
            return Ok(());
        }

        let half = self.half();
        if row < half || row + half >= pair.height() {
            return Ok(());
        }

        self.solve(pair, row, tables, out);

        Ok(())
    }

    fn solve(&self, pair: &StereoPair, row: usize, tables: &mut ScanlineTables, out: &mut [u32]) {
        trace!("Solving scanline {}", row);

        tables.build_dissimilarity(pair, &self.params.cost, row);
        tables.fill(self.params.occlusion_penalty);
        tables.backtrack(out);
    }
}

impl DisparityAlgorithm for ScanlineDp {
    /// Compute the disparity map for the given pair.
    fn compute(&mut self, pair: &StereoPair) -> Result<DisparityMap> {
        debug!("Computing scanline DP disparity with parameters: {:?}", self.params);

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
                .for_each_init(
                    || matcher.tables_for(pair),
                    |tables, (row, out)| matcher.solve(pair, row, tables, out)
                );
        }
        else {
            let mut tables = matcher.tables_for(pair);

            data.chunks_mut(width)
                .enumerate()
                .filter(|(row, _)| rows.contains(row))
                .for_each(|(row, out)| matcher.solve(pair, row, &mut tables, out));
        }

        disp_map.update_stats();

        info!(
            "Scanline DP complete, disparity range {:?}..{:?}",
            disp_map.min_disp, disp_map.max_disp
        );

        Ok(disp_map)
    }
}

impl ScanlineTables {
    pub fn new(size: usize, half: usize) -> Self {
        Self {
            size,
            half,
            dissimilarity: vec![0; size * size],
            dp: vec![0; (size + 1) * (size + 1)],
            moves: vec![None; size * size]
        }
    }

    /// Number of columns the tables are sized for.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether any column lies outside the kernel margin.
    pub fn has_interior(&self) -> bool {
        self.size > 2 * self.half
    }

    /// Dissimilarity between left column `r` and right column `c`.
    pub fn dissimilarity_at(&self, r: usize, c: usize) -> u64 {
        self.dissimilarity[r * self.size + c]
    }

    /// Cumulative path cost at `(r, c)`, where either index may be `-1`.
    pub fn dp_at(&self, r: isize, c: isize) -> u64 {
        self.dp[self.dp_index(r, c)]
    }

    /// Recorded predecessor at `(r, c)`, `None` outside the interior.
    pub fn move_at(&self, r: usize, c: usize) -> Option<Move> {
        self.moves[r * self.size + c]
    }

    #[inline]
    fn dp_index(&self, r: isize, c: isize) -> usize {
        (r + 1) as usize * (self.size + 1) + (c + 1) as usize
    }

    /// Fill the dissimilarity matrix for the given row.
    ///
    /// Entries for columns within the kernel margin are zeroed.
    pub fn build_dissimilarity<C: PatchCost + ?Sized>(
        &mut self,
        pair: &StereoPair,
        cost: &C,
        row: usize
    ) {
        let n = self.size;
        let half = self.half;

        for v in self.dissimilarity.iter_mut() {
            *v = 0;
        }
        if !self.has_interior() {
            return;
        }

        for col_left in half..(n - half) {
            for col_right in half..(n - half) {
                self.dissimilarity[col_left * n + col_right] =
                    cost.cost(pair, half, (row, col_left), (row, col_right));
            }
        }
    }

    /// Run the dynamic program over the current dissimilarity matrix.
    ///
    /// On equal costs the move is chosen in the order diagonal, left, up.
    pub fn fill(&mut self, occlusion_penalty: u64) {
        let n = self.size;
        let half = self.half;

        for v in self.dp.iter_mut() {
            *v = 0;
        }
        for m in self.moves.iter_mut() {
            *m = None;
        }
        if !self.has_interior() {
            return;
        }

        // Ramp along the boundary row and column
        let edge = half as isize - 1;
        for i in edge.min(0)..((n - half) as isize) {
            let ramp = (i.max(0) as u64).saturating_mul(occlusion_penalty);
            let top = self.dp_index(edge, i);
            let side = self.dp_index(i, edge);
            self.dp[top] = ramp;
            self.dp[side] = ramp;
        }

        for r in half..(n - half) {
            for c in half..(n - half) {
                let (ri, ci) = (r as isize, c as isize);
                let d = self.dissimilarity[r * n + c];

                let from_diag = self.dp_at(ri - 1, ci - 1).saturating_add(d);
                let from_left = self.dp_at(ri, ci - 1).saturating_add(d);
                let from_up = self.dp_at(ri - 1, ci).saturating_add(d);

                let (best, mv) = if from_diag <= from_left && from_diag <= from_up {
                    (from_diag, Move::Diagonal)
                }
                else if from_left <= from_up {
                    (from_left, Move::Left)
                }
                else {
                    (from_up, Move::Up)
                };

                let idx = self.dp_index(ri, ci);
                self.dp[idx] = best;
                self.moves[r * n + c] = Some(mv);
            }
        }
    }

    /// Follow the recorded moves from the bottom right interior corner, writing `|r - c|` into
    /// `out[r]` for every diagonal step.
    ///
    /// The walk ends as soon as either index leaves the interior.
    pub fn backtrack(&self, out: &mut [u32]) {
        if !self.has_interior() {
            return;
        }

        let lo = self.half;
        let corner = self.size - self.half - 1;
        let (mut r, mut c) = (corner, corner);

        loop {
            match self.move_at(r, c) {
                Some(Move::Diagonal) => {
                    out[r] = (r as i64 - c as i64).abs() as u32;
                    if r == lo || c == lo {
                        break;
                    }
                    r -= 1;
                    c -= 1;
                },
                Some(Move::Left) => {
                    if c == lo {
                        break;
                    }
                    c -= 1;
                },
                Some(Move::Up) => {
                    if r == lo {
                        break;
                    }
                    r -= 1;
                },
                None => break
            }
        }
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
