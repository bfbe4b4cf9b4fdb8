// SPDX-License-Identifier: GPL-3.0-only

//! Kinect v2 factory intrinsics
//!
//! Values a device reports before per-unit calibration has been read from
//! its firmware. Reference resolutions: 512x424 depth, 1920x1080 color.

use crate::backends::camera::{ColorCameraParams, IrCameraParams};

/// Depth camera focal length X (pixels)
pub const IR_FX: f32 = 365.456;
/// Depth camera focal length Y (pixels)
pub const IR_FY: f32 = 365.456;
/// Depth camera principal point X (pixels)
pub const IR_CX: f32 = 254.878;
/// Depth camera principal point Y (pixels)
pub const IR_CY: f32 = 205.395;

/// Radial distortion coefficients
pub const IR_K1: f32 = 0.0905474;
pub const IR_K2: f32 = -0.26819;
pub const IR_K3: f32 = 0.0950862;

/// Color camera focal length (pixels)
pub const COLOR_FX: f32 = 1081.37;
pub const COLOR_FY: f32 = 1081.37;
/// Color camera principal point (pixels)
pub const COLOR_CX: f32 = 959.5;
pub const COLOR_CY: f32 = 539.5;

pub fn factory_ir_params() -> IrCameraParams {
    IrCameraParams {
        fx: IR_FX,
        fy: IR_FY,
        cx: IR_CX,
        cy: IR_CY,
        k1: IR_K1,
        k2: IR_K2,
        k3: IR_K3,
        p1: 0.0,
        p2: 0.0,
    }
}

pub fn factory_color_params() -> ColorCameraParams {
    ColorCameraParams {
        fx: COLOR_FX,
        fy: COLOR_FY,
        cx: COLOR_CX,
        cy: COLOR_CY,
    }
}
