// SPDX-License-Identifier: GPL-3.0-only

//! Test patterns for the synthetic sensor
//!
//! Each generator is a pure function of the acquisition cycle so frames are
//! reproducible in tests.

use crate::backends::camera::{Frame, FramePixelFormat};
use crate::constants::{COLOR_HEIGHT, COLOR_WIDTH, DEPTH_HEIGHT, DEPTH_WIDTH};
use std::time::Instant;

/// Nearest distance the depth ramp reports (mm)
pub const RAMP_NEAR_MM: f32 = 500.0;
/// Farthest distance the depth ramp reports (mm)
pub const RAMP_FAR_MM: f32 = 4500.0;

/// Peak infrared amplitude in the pattern
pub const IR_PEAK: f32 = 4500.0;

/// Classic SMPTE-like bars in BGR order
const COLOR_BARS: [[u8; 3]; 8] = [
    [255, 255, 255],
    [0, 255, 255],
    [255, 255, 0],
    [0, 255, 0],
    [255, 0, 255],
    [0, 0, 255],
    [255, 0, 0],
    [0, 0, 0],
];

/// Diagonal depth ramp sweeping across the frame.
///
/// Every 16th row is left at 0 mm to mimic pixels without a reading.
pub fn depth_frame(cycle: u64) -> Frame {
    let width = DEPTH_WIDTH as usize;
    let height = DEPTH_HEIGHT as usize;
    let span = (width + height) as u64;
    let shift = (cycle * 4 % span) as usize;

    let mut samples = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            if y % 16 == 15 {
                samples.push(0.0);
                continue;
            }
            let t = ((x + y + shift) % (width + height)) as f32 / (width + height) as f32;
            samples.push(RAMP_NEAR_MM + t * (RAMP_FAR_MM - RAMP_NEAR_MM));
        }
    }

    float_frame(DEPTH_WIDTH, DEPTH_HEIGHT, &samples, cycle)
}

/// Radial infrared falloff around a center that orbits slowly.
pub fn ir_frame(cycle: u64) -> Frame {
    let width = DEPTH_WIDTH as f32;
    let height = DEPTH_HEIGHT as f32;
    let angle = cycle as f32 * 0.05;
    let center_x = width / 2.0 + angle.cos() * width / 6.0;
    let center_y = height / 2.0 + angle.sin() * height / 6.0;
    let radius = width.min(height) / 2.0;

    let mut samples = Vec::with_capacity((DEPTH_WIDTH * DEPTH_HEIGHT) as usize);
    for y in 0..DEPTH_HEIGHT {
        for x in 0..DEPTH_WIDTH {
            let dx = x as f32 - center_x;
            let dy = y as f32 - center_y;
            let falloff = 1.0 - ((dx * dx + dy * dy).sqrt() / radius).min(1.0);
            samples.push(falloff * IR_PEAK);
        }
    }

    float_frame(DEPTH_WIDTH, DEPTH_HEIGHT, &samples, cycle)
}

/// Vertical color bars scrolling horizontally, BGRX.
pub fn color_frame(cycle: u64) -> Frame {
    let width = COLOR_WIDTH as usize;
    let bar_width = width / COLOR_BARS.len();
    let shift = (cycle as usize * 8) % width;

    let mut row = Vec::with_capacity(width * 4);
    for x in 0..width {
        let bar = ((x + shift) % width) / bar_width;
        let [b, g, r] = COLOR_BARS[bar.min(COLOR_BARS.len() - 1)];
        row.extend_from_slice(&[b, g, r, 0]);
    }

    let mut data = Vec::with_capacity(row.len() * COLOR_HEIGHT as usize);
    for _ in 0..COLOR_HEIGHT {
        data.extend_from_slice(&row);
    }

    Frame {
        width: COLOR_WIDTH,
        height: COLOR_HEIGHT,
        format: FramePixelFormat::Bgrx,
        data,
        sequence: cycle,
        captured_at: Instant::now(),
    }
}

fn float_frame(width: u32, height: u32, samples: &[f32], cycle: u64) -> Frame {
    Frame {
        width,
        height,
        format: FramePixelFormat::Float,
        data: bytemuck::cast_slice(samples).to_vec(),
        sequence: cycle,
        captured_at: Instant::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(frame: &Frame) -> Vec<f32> {
        frame
            .data
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn test_frames_have_sensor_geometry() {
        for frame in [depth_frame(0), ir_frame(0), color_frame(0)] {
            assert_eq!(
                frame.data.len(),
                frame.expected_len(),
                "{:?} byte length",
                frame
            );
        }
        assert_eq!(color_frame(3).width, COLOR_WIDTH);
        assert_eq!(depth_frame(3).height, DEPTH_HEIGHT);
    }

    #[test]
    fn test_depth_ramp_in_range() {
        let depth = samples(&depth_frame(17));
        assert!(depth.iter().all(|&d| d == 0.0 || (RAMP_NEAR_MM..=RAMP_FAR_MM).contains(&d)));
        assert!(depth.iter().any(|&d| d == 0.0), "holes should be present");
    }

    #[test]
    fn test_patterns_move_between_cycles() {
        assert_ne!(depth_frame(0).data, depth_frame(1).data);
        assert_ne!(color_frame(0).data, color_frame(1).data);
    }

    #[test]
    fn test_color_padding_byte_zero() {
        let frame = color_frame(5);
        assert!(frame.data.chunks_exact(4).all(|px| px[3] == 0));
    }
}
