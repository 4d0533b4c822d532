//! Visual stimulus generation: a fixation cross and its fading frame
//! sequence.
//!
//! Frames are written as numbered PNGs; encoding them into a video
//! container is left to external tooling (e.g. ffmpeg), so a failed encode
//! can never corrupt generated event files.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use tracing::info;

use crate::error::{Error, Result};

/// Draw a centred fixation cross. The cross is sized from the shorter
/// screen dimension by `size_ratio`, with black lines `thickness` pixels
/// wide on the given background color.
pub fn generate_fixation_cross(
    screen_size: (u32, u32),
    size_ratio: f32,
    thickness: u32,
    background: [u8; 4],
) -> RgbaImage {
    let (width, height) = screen_size;
    let shorter = width.min(height);
    let cross_size = (shorter as f32 * size_ratio) as u32;

    let x1 = (width - cross_size) / 2;
    let x2 = x1 + cross_size;
    let y1 = (height - cross_size) / 2;
    let y2 = y1 + cross_size;
    let center_x = (x1 + x2) / 2;
    let center_y = (y1 + y2) / 2;

    let mut image = RgbaImage::from_pixel(width, height, Rgba(background));
    let black = Rgba([0, 0, 0, 255]);

    // Horizontal bar.
    for y in line_span(center_y, thickness, height) {
        for x in x1..x2 {
            image.put_pixel(x, y, black);
        }
    }
    // Vertical bar.
    for x in line_span(center_x, thickness, width) {
        for y in y1..y2 {
            image.put_pixel(x, y, black);
        }
    }
    image
}

fn line_span(center: u32, thickness: u32, limit: u32) -> std::ops::Range<u32> {
    let half = thickness / 2;
    let start = center.saturating_sub(half);
    let end = (center + thickness - half).min(limit);
    start..end
}

/// Write the frame sequence for a fixation video with a linear fade-out.
///
/// With `fade_seconds` set, the image stays at full opacity until
/// `duration - fade_seconds` and fades to transparent at the end; without
/// it the fade spans the whole clip. Returns the frame paths in order.
pub fn generate_fixation_frames(
    image: &RgbaImage,
    output_dir: &Path,
    duration_seconds: u32,
    frame_rate: u32,
    fade_seconds: Option<f32>,
) -> Result<Vec<PathBuf>> {
    if duration_seconds == 0 || frame_rate == 0 {
        return Err(Error::Config(
            "frame sequence duration and frame rate must be greater than 0".into(),
        ));
    }
    if let Some(fade) = fade_seconds {
        if !(0.0..=duration_seconds as f32).contains(&fade) {
            return Err(Error::Config(format!(
                "fade_seconds ({fade}) must fit in the {duration_seconds} second clip"
            )));
        }
    }
    fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;

    let total_frames = duration_seconds * frame_rate;
    let fade_start_frame = match fade_seconds {
        Some(fade) => ((duration_seconds as f32 - fade) * frame_rate as f32) as i64,
        None => 0,
    };

    let mut paths = Vec::with_capacity(total_frames as usize);
    for frame in 0..i64::from(total_frames) {
        let opacity = frame_opacity(frame, fade_start_frame, i64::from(total_frames));
        let faded = apply_opacity(image, opacity);
        let path = output_dir.join(format!("frame_{frame:06}.png"));
        faded.save(&path).map_err(|e| Error::Image {
            path: path.clone(),
            source: e,
        })?;
        paths.push(path);
    }
    info!(
        dir = %output_dir.display(),
        frames = total_frames,
        "wrote fixation frame sequence"
    );
    Ok(paths)
}

/// Opacity for one frame of the linear fade, clipped to 0..=255.
fn frame_opacity(frame: i64, fade_start_frame: i64, total_frames: i64) -> u8 {
    let span = (total_frames - fade_start_frame).max(1) as f64;
    let raw = 255.0 - (frame - fade_start_frame) as f64 * (255.0 / span);
    raw.clamp(0.0, 255.0) as u8
}

fn apply_opacity(image: &RgbaImage, opacity: u8) -> RgbaImage {
    let factor = f32::from(opacity) / 255.0;
    let mut faded = image.clone();
    for pixel in faded.pixels_mut() {
        for channel in &mut pixel.0 {
            *channel = (f32::from(*channel) * factor) as u8;
        }
    }
    faded
}
