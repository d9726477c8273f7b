//! Loading algorithm parameters from TOML

use cv_dp_disparity::{block, config, cost::CostFunction, scanline, Error};

#[test]
fn scanline_params_from_str() {
    let params: scanline::Params = config::params_from_str(
        "kernel_size = 5\nocclusion_penalty = 10\ncost = \"ncc\"\n"
    ).unwrap();

    assert_eq!(params.kernel_size, 5);
    assert_eq!(params.occlusion_penalty, 10);
    assert_eq!(params.cost, CostFunction::Ncc);
    assert!(!params.parallel);
}

#[test]
fn block_params_default_to_ssd() {
    let params: block::Params = config::params_from_str(
        "kernel_size = 11\nmax_shift = 100\nparallel = true\n"
    ).unwrap();

    assert_eq!(params.max_shift, 100);
    assert_eq!(params.cost, CostFunction::Ssd);
    assert!(params.parallel);
}

#[test]
fn malformed_params_are_reported() {
    let res: cv_dp_disparity::Result<scanline::Params> =
        config::params_from_str("kernel_size = \"five\"\n");
    assert!(matches!(res, Err(Error::Config(_))));

    let res: cv_dp_disparity::Result<block::Params> =
        config::load_params("this/file/does/not/exist.toml");
    assert!(matches!(res, Err(Error::Io(_))));
}

#[test]
fn params_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::temp_dir().join(format!("cv_dp_disparity_{}.toml", std::process::id()));
    std::fs::write(&path, "kernel_size = 3\nocclusion_penalty = 0\n")?;

    let params: scanline::Params = config::load_params(&path)?;
    std::fs::remove_file(&path)?;

    assert_eq!(params.kernel_size, 3);
    assert_eq!(params.occlusion_penalty, 0);

    Ok(())
}
