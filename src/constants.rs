// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants
//!
//! Sensor geometry and display layout for Kinect v2 class time-of-flight
//! cameras. Frame buffers delivered by the driver and the display textures
//! share these dimensions for the whole process lifetime.

/// Depth and infrared frame width (pixels)
pub const DEPTH_WIDTH: u32 = 512;
/// Depth and infrared frame height (pixels)
pub const DEPTH_HEIGHT: u32 = 424;

/// Color frame width (pixels)
pub const COLOR_WIDTH: u32 = 1920;
/// Color frame height (pixels)
pub const COLOR_HEIGHT: u32 = 1080;

/// Bytes per depth/infrared sample (`f32`)
pub const FLOAT_SAMPLE_BYTES: usize = 4;
/// Bytes per color pixel (BGRX, 8 bits per channel)
pub const COLOR_PIXEL_BYTES: usize = 4;

/// Nominal maximum range of the sensor in millimetres.
///
/// Depth and infrared samples are divided by this to land roughly in
/// `0.0..=1.0` for direct texture sampling. Values beyond it are kept as-is.
pub const NOMINAL_MAX_DEPTH_MM: f32 = 4500.0;

/// Window width: twice the depth resolution
pub const WINDOW_WIDTH: u32 = DEPTH_WIDTH * 2;
/// Window height: twice the depth resolution
pub const WINDOW_HEIGHT: u32 = DEPTH_HEIGHT * 2;

/// Window title
pub const WINDOW_TITLE: &str = "Depth Viewer";

/// Default frame rate of the synthetic sensor
pub const DEFAULT_SIMULATED_FRAME_RATE: u32 = 30;
