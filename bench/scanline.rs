use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cv_dp_disparity::{
    prelude::*,
    block::{self, BlockMatcher},
    scanline::{self, ScanlineDp}
};
use image::GrayImage;

fn texture(width: u32, height: u32, shift: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let v = (x + shift).wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503);
        image::Luma([(v >> 13) as u8])
    })
}

fn disparity_bench(c: &mut Criterion) {

    // Build pair
    let left = texture(128, 48, 0);
    let right = texture(128, 48, 4);
    let pair = StereoPair::new(&left, &right).unwrap();

    // Build disparity algs
    let mut dp = ScanlineDp::new(scanline::Params {
        kernel_size: 5,
        occlusion_penalty: 10,
        cost: CostFunction::Ssd,
        parallel: false
    }).unwrap();
    let mut dp_par = ScanlineDp::new(scanline::Params {
        kernel_size: 5,
        occlusion_penalty: 10,
        cost: CostFunction::Ssd,
        parallel: true
    }).unwrap();
    let mut bm = BlockMatcher::new(block::Params {
        kernel_size: 5,
        max_shift: 16,
        cost: CostFunction::Ssd,
        parallel: false
    }).unwrap();

    // Benchmark compute functions
    c.bench_function("scanline dp 128x48", |b| b.iter(|| dp.compute(black_box(&pair))));
    c.bench_function("scanline dp parallel 128x48", |b| b.iter(|| dp_par.compute(black_box(&pair))));
    c.bench_function("block matching 128x48", |b| b.iter(|| bm.compute(black_box(&pair))));
}

criterion_group!(benches, disparity_bench);
criterion_main!(benches);
