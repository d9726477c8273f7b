//! Disparity computation on synthetic stereo pairs with a known shift

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use cv_dp_disparity::{
    prelude::*,
    block::{self, BlockMatcher},
    cost::Ssd,
    scanline::{self, ScanlineDp},
    Error
};
use image::GrayImage;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

const WIDTH: u32 = 40;
const HEIGHT: u32 = 7;
const SHIFT: u32 = 3;

// -----------------------------------------------------------------------------------------------
// HELPERS
// -----------------------------------------------------------------------------------------------

/// Pseudo-random texture, row-major, so the pair has no repeated patches.
fn texture(width: u32, height: u32, seed: u32) -> GrayImage {
    let mut state = seed;
    let mut data = Vec::with_capacity((width * height) as usize);

    for _ in 0..(width * height) {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        data.push((state >> 16) as u8);
    }

    GrayImage::from_raw(width, height, data).unwrap()
}

/// A pair where `right[row][col] == left[row][col + SHIFT]`.
fn shifted_pair() -> (GrayImage, GrayImage) {
    let tex = texture(WIDTH + SHIFT, HEIGHT, 7);
    let left = GrayImage::from_fn(WIDTH, HEIGHT, |x, y| *tex.get_pixel(x, y));
    let right = GrayImage::from_fn(WIDTH, HEIGHT, |x, y| *tex.get_pixel(x + SHIFT, y));

    (left, right)
}

fn dp_params(kernel_size: usize, parallel: bool) -> scanline::Params {
    scanline::Params {
        kernel_size,
        occlusion_penalty: 20,
        cost: CostFunction::Ssd,
        parallel
    }
}

fn block_params(kernel_size: usize, parallel: bool) -> block::Params {
    block::Params {
        kernel_size,
        max_shift: 8,
        cost: CostFunction::Ssd,
        parallel
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[test]
fn mismatched_pairs_are_rejected() {
    let left = GrayImage::new(10, 4);
    let right = GrayImage::new(9, 4);

    match StereoPair::new(&left, &right) {
        Err(Error::DimensionMismatch { left, right }) => {
            assert_eq!(left, (10, 4));
            assert_eq!(right, (9, 4));
        },
        _ => panic!("expected a dimension mismatch")
    }
}

#[test]
fn pair_borrows_both_images() {
    let (left, right) = shifted_pair();
    let pair = StereoPair::new(&left, &right).unwrap();

    assert!(std::ptr::eq(pair.left(), &left));
    assert!(std::ptr::eq(pair.right(), &right));
    assert_eq!((pair.width(), pair.height()), (WIDTH as usize, HEIGHT as usize));
    assert_eq!(pair.right_at(2, 5), pair.left_at(2, 5 + SHIFT as usize));
}

#[test]
fn ssd_is_zero_for_coincident_centres_of_identical_images() {
    let img = texture(12, 12, 3);
    let pair = StereoPair::new(&img, &img).unwrap();

    for row in 2..10 {
        for col in 2..10 {
            assert_eq!(Ssd.cost(&pair, 2, (row, col), (row, col)), 0);
        }
    }
}

#[test]
fn ssd_grows_with_any_single_difference() {
    let mut left = texture(9, 9, 11);
    left.put_pixel(5, 3, image::Luma([100]));

    let cost_with = |value: u8| {
        let mut right = left.clone();
        right.put_pixel(5, 3, image::Luma([value]));
        let pair = StereoPair::new(&left, &right).unwrap();
        Ssd.cost(&pair, 1, (4, 4), (4, 4))
    };

    assert_eq!(cost_with(100), 0);
    assert_eq!(cost_with(140), 40 * 40);
    assert!(cost_with(140) < cost_with(180));
    assert!(cost_with(140) < cost_with(20));
}

#[test]
fn scanline_dp_recovers_constant_shift() {
    let (left, right) = shifted_pair();
    let pair = StereoPair::new(&left, &right).unwrap();

    let map = ScanlineDp::new(dp_params(3, false)).unwrap().compute(&pair).unwrap();

    for row in 1..(HEIGHT as usize - 1) {
        for col in (1 + SHIFT as usize)..(WIDTH as usize - 1) {
            assert_eq!(map.get(col, row), SHIFT, "row {} col {}", row, col);
        }
    }

    // Kernel margin is never written
    for col in 0..WIDTH as usize {
        assert_eq!(map.get(col, 0), 0);
        assert_eq!(map.get(col, HEIGHT as usize - 1), 0);
    }
    for row in 0..HEIGHT as usize {
        assert_eq!(map.get(0, row), 0);
        assert_eq!(map.get(WIDTH as usize - 1, row), 0);
    }

    assert_eq!(map.max_disp, Some(SHIFT));
    assert_eq!(map.max_value(), SHIFT);
}

#[test]
fn block_matcher_recovers_constant_shift() {
    let (left, right) = shifted_pair();
    let pair = StereoPair::new(&left, &right).unwrap();

    let mut matcher = BlockMatcher::new(block_params(3, false)).unwrap();

    for row in 1..(HEIGHT as usize - 1) {
        for col in (1 + SHIFT as usize)..(WIDTH as usize - 1) {
            assert_eq!(matcher.best_shift(&pair, row, col), Some(SHIFT as usize));
        }
    }
    assert_eq!(matcher.best_shift(&pair, 0, 10), None);

    let map = matcher.compute(&pair).unwrap();

    // round(3 / 8 * 255)
    assert_eq!(matcher.scale_shift(SHIFT as usize), 96);
    for row in 1..(HEIGHT as usize - 1) {
        for col in (1 + SHIFT as usize)..(WIDTH as usize - 1) {
            assert_eq!(map.get(col, row), 96);
        }
    }
    for col in 0..WIDTH as usize {
        assert_eq!(map.get(col, 0), 0);
    }
}

#[test]
fn block_matcher_recovers_constant_shift_with_ncc() {
    let (left, right) = shifted_pair();
    let pair = StereoPair::new(&left, &right).unwrap();

    let matcher = BlockMatcher::new(block::Params {
        cost: CostFunction::Ncc,
        ..block_params(3, false)
    }).unwrap();

    for row in 1..(HEIGHT as usize - 1) {
        for col in (1 + SHIFT as usize)..(WIDTH as usize - 1) {
            assert_eq!(matcher.best_shift(&pair, row, col), Some(SHIFT as usize));
        }
    }
}

#[test]
fn block_matcher_rejects_empty_shift_range() {
    let params = block::Params {
        max_shift: 0,
        ..block_params(3, false)
    };

    assert!(matches!(BlockMatcher::new(params), Err(Error::InvalidParams(_))));
}

#[test]
fn even_kernels_are_rejected() {
    for &kernel_size in &[2, 4, 12] {
        assert!(matches!(
            ScanlineDp::new(dp_params(kernel_size, false)),
            Err(Error::InvalidParams(_))
        ));
        assert!(matches!(
            BlockMatcher::new(block_params(kernel_size, false)),
            Err(Error::InvalidParams(_))
        ));
    }

    let dp = ScanlineDp::new(dp_params(3, false)).unwrap();
    assert_eq!(dp.params().kernel_size, 3);
    assert_eq!(dp.params().occlusion_penalty, 20);

    let bm = BlockMatcher::new(block_params(5, true)).unwrap();
    assert_eq!(bm.params().kernel_size, 5);
    assert_eq!(bm.params().max_shift, 8);
    assert!(bm.params().parallel);
}

#[test]
fn scanline_dp_is_deterministic() {
    let (left, right) = shifted_pair();
    let pair = StereoPair::new(&left, &right).unwrap();

    let mut matcher = ScanlineDp::new(dp_params(3, false)).unwrap();
    let first = matcher.compute(&pair).unwrap();
    let second = matcher.compute(&pair).unwrap();

    assert_eq!(first.as_raw(), second.as_raw());
}

#[test]
fn parallel_rows_match_sequential_rows() {
    let left = texture(32, 12, 5);
    let right = texture(32, 12, 6);
    let pair = StereoPair::new(&left, &right).unwrap();

    let seq = ScanlineDp::new(dp_params(3, false)).unwrap().compute(&pair).unwrap();
    let par = ScanlineDp::new(dp_params(3, true)).unwrap().compute(&pair).unwrap();
    assert_eq!(seq, par);

    let seq = BlockMatcher::new(block_params(5, false)).unwrap().compute(&pair).unwrap();
    let par = BlockMatcher::new(block_params(5, true)).unwrap().compute(&pair).unwrap();
    assert_eq!(seq, par);
}

#[test]
fn single_row_pair_shifted_by_one() {
    let left = GrayImage::from_raw(5, 1, vec![10, 20, 30, 40, 50]).unwrap();
    let right = GrayImage::from_raw(5, 1, vec![10, 10, 20, 30, 40]).unwrap();
    let pair = StereoPair::new(&left, &right).unwrap();

    let map = ScanlineDp::new(scanline::Params {
        kernel_size: 1,
        occlusion_penalty: 5,
        cost: CostFunction::Ssd,
        parallel: false
    }).unwrap().compute(&pair).unwrap();

    assert_eq!(map.row(0), &[1, 1, 1, 1, 0]);
}

#[test]
fn oversized_kernels_leave_the_map_unset() {
    let (left, right) = shifted_pair();
    let pair = StereoPair::new(&left, &right).unwrap();

    // No kernel, taller than the pair, wider than the pair
    for &kernel_size in &[0, 9, 41, 81] {
        let map = ScanlineDp::new(dp_params(kernel_size, false))
            .unwrap()
            .compute(&pair).unwrap();
        assert!(map.is_unset(), "kernel {}", kernel_size);
        assert_eq!((map.width(), map.height()), (WIDTH as usize, HEIGHT as usize));

        let map = BlockMatcher::new(block_params(kernel_size, false))
            .unwrap()
            .compute(&pair)
            .unwrap();
        assert!(map.is_unset(), "kernel {}", kernel_size);
    }
}

#[test]
fn empty_images_produce_empty_maps() {
    let img = GrayImage::new(0, 0);
    let pair = StereoPair::new(&img, &img).unwrap();

    let map = ScanlineDp::new(dp_params(1, true)).unwrap().compute(&pair).unwrap();
    assert!(map.as_raw().is_empty());

    let map = BlockMatcher::new(block_params(1, true)).unwrap().compute(&pair).unwrap();
    assert!(map.as_raw().is_empty());
}
