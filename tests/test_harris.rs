// tests/test_harris.rs — End-to-end tests for the Harris detector.

use harris_corners::gradient::compute_derivatives;
use harris_corners::harris::harris_response;
use harris_corners::image::Image;
use harris_corners::nms::MaximaSelector;
use harris_corners::{HarrisConfig, HarrisDetector, KeyPoint, Smoothing};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// White L-shaped region on black: a horizontal and a vertical bar meeting
/// at an outer corner at (`c`, `c`).
fn make_l_shape(size: usize, c: usize, thickness: usize) -> Image<f32> {
    let mut img = Image::new(size, size);
    for y in c..size {
        for x in c..(c + thickness).min(size) {
            img.set(x, y, 1.0);
        }
    }
    for y in c..(c + thickness).min(size) {
        for x in c..size {
            img.set(x, y, 1.0);
        }
    }
    img
}

/// Deterministic texture with plenty of structure.
fn make_texture(w: usize, h: usize) -> Image<f32> {
    let mut img = Image::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let v = ((x * 31 + y * 17) % 23) as f32 / 22.0;
            let block = if (x / 6 + y / 5) % 2 == 0 { 0.3 } else { 0.0 };
            img.set(x, y, v * 0.5 + block);
        }
    }
    img
}

// ===== Derivative / response dimensions =====

#[test]
fn derivative_grids_share_dimensions() {
    for (w, h) in [(3, 3), (10, 4), (17, 29)] {
        let d = compute_derivatives(&make_texture(w, h));
        for grid in [&d.ix, &d.iy, &d.ixy] {
            assert_eq!((grid.width(), grid.height()), (w - 2, h - 2));
        }
    }
}

#[test]
fn flat_image_has_zero_derivatives_and_response() {
    let img = Image::filled(12, 9, 0.25f32);
    let d = compute_derivatives(&img);
    assert!(d.ix.pixels().all(|(_, _, v)| v == 0.0));
    assert!(d.iy.pixels().all(|(_, _, v)| v == 0.0));
    assert!(d.ixy.pixels().all(|(_, _, v)| v == 0.0));
    let r = harris_response(&d, 0.04);
    assert!(r.pixels().all(|(_, _, v)| v == 0.0));
}

// ===== Corner localization =====

fn near(k: &KeyPoint, (cx, cy): (usize, usize), radius: usize) -> bool {
    k.x.abs_diff(cx) <= radius && k.y.abs_diff(cy) <= radius
}

fn config_with(smoothing: Smoothing, radius: usize) -> HarrisConfig {
    HarrisConfig {
        k: 0.04,
        filter_range: 1,
        smoothing,
        percentage: 0.01,
        suppression_radius: radius,
    }
}

#[test]
fn single_corner_has_maximal_response() {
    init_logger();
    // The L's arms run off the image, leaving one corner inside the frame.
    let (c, radius) = (12, 2);
    let img = make_l_shape(24, c, 12);
    for smoothing in [Smoothing::Gaussian { sigma: 1.0 }, Smoothing::Box] {
        let det = HarrisDetector::new(config_with(smoothing, radius)).unwrap();
        let kps = det.detect(&img).unwrap();
        assert!(
            near(&kps[0], (c, c), radius),
            "{smoothing:?}: strongest keypoint at ({}, {}), corner at ({c}, {c})",
            kps[0].x,
            kps[0].y
        );
    }
}

#[test]
fn l_shape_outer_and_inner_corners_lead() {
    // Outer corner at (12, 12), inner corner at (22, 22).
    let radius = 2;
    let img = make_l_shape(30, 12, 10);
    for smoothing in [Smoothing::Gaussian { sigma: 1.0 }, Smoothing::Box] {
        let det = HarrisDetector::new(config_with(smoothing, radius)).unwrap();
        let kps = det.detect(&img).unwrap();
        assert!(kps.len() >= 2);
        let (a, b) = (&kps[0], &kps[1]);
        let found = (near(a, (12, 12), radius) && near(b, (22, 22), radius))
            || (near(a, (22, 22), radius) && near(b, (12, 12), radius));
        assert!(
            found,
            "{smoothing:?}: leading keypoints ({}, {}) and ({}, {})",
            a.x,
            a.y,
            b.x,
            b.y
        );
    }
}

// ===== Selection =====

#[test]
fn full_percentage_without_suppression_returns_every_pixel() {
    let img = make_texture(21, 16);
    for r in 0..3 {
        let det = HarrisDetector::new(HarrisConfig {
            k: 0.05,
            filter_range: r,
            smoothing: Smoothing::Box,
            percentage: 1.0,
            suppression_radius: 0,
        })
        .unwrap();
        let kps = det.detect(&img).unwrap();
        assert_eq!(kps.len(), (21 - 2 - 2 * r) * (16 - 2 - 2 * r), "filter_range {r}");
    }
}

#[test]
fn keypoints_are_in_input_coordinates() {
    // With percentage 1 and no suppression every response pixel comes back,
    // so the coordinates must cover exactly the cropped interior.
    let img = make_texture(15, 12);
    let r = 2;
    let det = HarrisDetector::new(HarrisConfig {
        filter_range: r,
        percentage: 1.0,
        suppression_radius: 0,
        ..HarrisConfig::default()
    })
    .unwrap();
    let kps = det.detect(&img).unwrap();
    let offset = 1 + r;
    assert!(kps.iter().all(|k| k.x >= offset && k.x < 15 - offset));
    assert!(kps.iter().all(|k| k.y >= offset && k.y < 12 - offset));

    let response = det.corner_response(&img).unwrap();
    for k in &kps {
        assert_eq!(k.response, response.get(k.x - offset, k.y - offset));
    }
}

#[test]
fn suppressed_keypoints_keep_their_distance() {
    let img = make_texture(40, 40);
    let radius = 3;
    let det = HarrisDetector::new(HarrisConfig {
        percentage: 0.05,
        suppression_radius: radius,
        ..HarrisConfig::default()
    })
    .unwrap();
    let kps = det.detect(&img).unwrap();
    assert!(!kps.is_empty());
    for (i, a) in kps.iter().enumerate() {
        for b in &kps[i + 1..] {
            assert!(
                a.x.abs_diff(b.x) > radius || a.y.abs_diff(b.y) > radius,
                "({}, {}) and ({}, {}) within suppression radius",
                a.x,
                a.y,
                b.x,
                b.y
            );
        }
    }
}

#[test]
fn fewer_keypoints_when_suppression_exhausts_candidates() {
    // 8×8 response grid, 100% requested, radius 3: at most 4 survive.
    let img = make_texture(10, 10);
    let det = HarrisDetector::new(HarrisConfig {
        filter_range: 0,
        percentage: 1.0,
        suppression_radius: 3,
        ..HarrisConfig::default()
    })
    .unwrap();
    let kps = det.detect(&img).unwrap();
    assert!(!kps.is_empty());
    assert!(kps.len() <= 4, "got {}", kps.len());
}

#[test]
fn selector_matches_detector() {
    let img = make_texture(30, 25);
    let config = HarrisConfig::default();
    let det = HarrisDetector::new(config.clone()).unwrap();
    let response = det.corner_response(&img).unwrap();
    let manual = MaximaSelector::new(config.percentage, config.suppression_radius)
        .select(&response, config.coordinate_offset());
    assert_eq!(manual, det.detect(&img).unwrap());
}

// ===== Determinism =====

#[test]
fn detection_is_reproducible() {
    let img = make_texture(64, 48);
    for smoothing in [Smoothing::Gaussian { sigma: 1.3 }, Smoothing::Box] {
        let det = HarrisDetector::new(HarrisConfig {
            smoothing,
            filter_range: 2,
            percentage: 0.1,
            suppression_radius: 1,
            ..HarrisConfig::default()
        })
        .unwrap();
        let a = det.detect(&img).unwrap();
        let b = det.detect(&img).unwrap();
        assert_eq!(a.len(), b.len());
        for (ka, kb) in a.iter().zip(&b) {
            assert_eq!((ka.x, ka.y), (kb.x, kb.y));
            assert_eq!(ka.response.to_bits(), kb.response.to_bits());
        }
    }
}

// ===== End-to-end scenario =====

#[test]
fn zero_image_scenario() {
    init_logger();
    let img = Image::<f32>::new(10, 10);
    let config = HarrisConfig::with_sigma(0.04, 1, 1.0, 0.1, 1);
    assert_eq!(config.smoothing, Smoothing::Gaussian { sigma: 1.0 });
    let det = HarrisDetector::new(config).unwrap();
    let kps = det.detect(&img).unwrap();

    // 6×6 response grid, floor(36 · 0.1) = 3, all tied at zero and taken
    // in scan order with a 1-pixel suppression footprint.
    assert_eq!(
        kps,
        vec![
            KeyPoint::new(2, 2, 0.0),
            KeyPoint::new(4, 2, 0.0),
            KeyPoint::new(6, 2, 0.0),
        ]
    );
}

#[test]
fn color_and_gray_bytes_agree_for_neutral_input() {
    let (w, h) = (20, 16);
    let mut gray = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            gray.push(if x > 8 && y > 6 { 200u8 } else { 40u8 });
        }
    }
    let rgb: Vec<u8> = gray.iter().flat_map(|&v| [v, v, v]).collect();

    let det = HarrisDetector::new(HarrisConfig::default()).unwrap();
    let a = det.detect_bytes(&gray, w, h, 1).unwrap();
    let b = det.detect_bytes(&rgb, w, h, 3).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}
