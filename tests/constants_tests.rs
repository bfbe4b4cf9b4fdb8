// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use depth_viewer::constants::*;
use depth_viewer::render::{TextureSlot, display_layout};

#[test]
fn test_sensor_geometry() {
    assert_eq!((DEPTH_WIDTH, DEPTH_HEIGHT), (512, 424));
    assert_eq!((COLOR_WIDTH, COLOR_HEIGHT), (1920, 1080));
}

#[test]
fn test_window_is_twice_depth_resolution() {
    assert_eq!(WINDOW_WIDTH, 2 * DEPTH_WIDTH);
    assert_eq!(WINDOW_HEIGHT, 2 * DEPTH_HEIGHT);
}

#[test]
fn test_nominal_range() {
    assert_eq!(NOMINAL_MAX_DEPTH_MM, 4500.0);
}

#[test]
fn test_texture_byte_lengths() {
    assert_eq!(TextureSlot::Depth.byte_len(), 512 * 424 * 4);
    assert_eq!(TextureSlot::Ir.byte_len(), 512 * 424 * 4);
    assert_eq!(TextureSlot::Color.byte_len(), 1920 * 1080 * 4);
}

#[test]
fn test_layout_fits_window() {
    for quad in display_layout() {
        assert!(
            quad.x + quad.width <= WINDOW_WIDTH as f32 && quad.y + quad.height <= WINDOW_HEIGHT as f32,
            "{:?} quad leaves the window",
            quad.slot
        );
    }
}
