// demos/harris_keypoints.rs
//
// Detect Harris keypoints and dump them for inspection.
// Run with:
//   cargo run --example harris_keypoints -- [image] [--config params.json] [--out dir]
//
// Without an image a synthetic rectangles scene is used. Output lands in
// `harris_output/` by default:
//   keypoints.json  detected points, strongest first
//   response.png    response map rescaled to 8 bits
//   overlay.svg     input image with the keypoints drawn on top

use anyhow::Context;
use harris_corners::convert::{f32_normalized_to_u8, from_dynamic_image, response_to_u8};
use harris_corners::image::Image;
use harris_corners::nms::normalize_responses;
use harris_corners::{load_config, HarrisConfig, HarrisDetector, KeyPoint};
use image::{GrayImage, ImageReader};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Serialize)]
struct KeyPointDump<'a> {
    image: String,
    width: usize,
    height: usize,
    config: &'a HarrisConfig,
    keypoints: Vec<KeyPoint>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut input: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut out_dir = PathBuf::from("harris_output");
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("expected a path after --config")?;
                config_path = Some(path.into());
            }
            "--out" => out_dir = args.next().context("expected a directory after --out")?.into(),
            other if other.starts_with("--") => anyhow::bail!("unknown argument: {other}"),
            other => input = Some(other.into()),
        }
    }

    let config = match &config_path {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path.display()))?,
        None => HarrisConfig::default(),
    };

    let (name, img) = match &input {
        Some(path) => {
            let decoded = ImageReader::open(path)?.decode()?;
            (path.display().to_string(), from_dynamic_image(&decoded)?)
        }
        None => ("synthetic".to_string(), make_rectangles()),
    };

    let det = HarrisDetector::new(config)?;
    let started = Instant::now();
    let response = det.corner_response(&img)?;
    let mut keypoints = det.detect(&img)?;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    println!("image {}x{} ({name})", img.width(), img.height());
    println!("harris: {elapsed_ms:6.2} ms, {} keypoints", keypoints.len());
    for kp in keypoints.iter().take(10) {
        println!("  ({:4}, {:4})  {:.4}", kp.x, kp.y, kp.response);
    }

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let svg = render_svg(&img, &keypoints, &format!("{name} - {} keypoints", keypoints.len()))?;
    fs::write(out_dir.join("overlay.svg"), svg)?;

    let shown = response_to_u8(&response);
    let png = GrayImage::from_raw(shown.width() as u32, shown.height() as u32, shown.into_vec())
        .context("response buffer does not match its dimensions")?;
    png.save(out_dir.join("response.png"))?;

    normalize_responses(&mut keypoints);
    let dump = KeyPointDump {
        image: name,
        width: img.width(),
        height: img.height(),
        config: det.config(),
        keypoints,
    };
    fs::write(out_dir.join("keypoints.json"), serde_json::to_string_pretty(&dump)?)?;

    println!("wrote {}/{{keypoints.json,response.png,overlay.svg}}", out_dir.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Synthetic scene
// ---------------------------------------------------------------------------

fn make_rectangles() -> Image<f32> {
    let mut img = Image::filled(120, 120, 20.0 / 255.0);
    let rects = [
        (10, 10, 25, 25),
        (50, 8, 35, 20),
        (15, 55, 20, 40),
        (60, 45, 40, 30),
        (75, 85, 30, 25),
    ];
    for &(rx, ry, rw, rh) in &rects {
        for y in ry..(ry + rh).min(120) {
            for x in rx..(rx + rw).min(120) {
                img.set(x, y, 220.0 / 255.0);
            }
        }
    }
    img
}

// ---------------------------------------------------------------------------
// SVG rendering
// ---------------------------------------------------------------------------

const SCALE: usize = 4;

fn render_svg(
    img: &Image<f32>,
    keypoints: &[KeyPoint],
    title: &str,
) -> Result<String, std::fmt::Error> {
    let sw = img.width() * SCALE;
    let sh = img.height() * SCALE + 30;
    let gray = f32_normalized_to_u8(img);

    let mut svg = String::new();
    writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {sw} {sh}\" width=\"{sw}\" height=\"{sh}\">"
    )?;
    writeln!(svg, "<style>text {{ font-family: monospace; font-size: 14px; fill: #333; }}</style>")?;
    writeln!(svg, "<text x=\"10\" y=\"20\" font-weight=\"bold\">{title}</text>")?;
    writeln!(svg, "<g transform=\"translate(0, 30)\">")?;

    // One rect per pixel is heavy for large inputs; fine for inspection crops.
    for (x, y, v) in gray.pixels() {
        writeln!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{SCALE}\" height=\"{SCALE}\" fill=\"rgb({v},{v},{v})\"/>",
            x * SCALE,
            y * SCALE
        )?;
    }
    let half = SCALE / 2;
    for kp in keypoints {
        writeln!(
            svg,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"none\" stroke=\"#ff2222\" stroke-width=\"1.5\"/>",
            kp.x * SCALE + half,
            kp.y * SCALE + half,
            SCALE + 1
        )?;
    }

    writeln!(svg, "</g>")?;
    writeln!(svg, "</svg>")?;
    Ok(svg)
}
