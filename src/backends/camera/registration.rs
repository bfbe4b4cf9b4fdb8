// SPDX-License-Identifier: GPL-3.0-only

//! Depth/color registration helper
//!
//! Holds the intrinsics of both cameras of a device. The viewer builds one per
//! streaming session but does not map pixels through it while drawing; the
//! unprojection below is available for callers that need metric points.

use super::types::{ColorCameraParams, IrCameraParams};

/// Depth values at or below this (metres) are treated as no reading
const MIN_VALID_DEPTH_M: f32 = 0.001;

/// Intrinsics bridge between the depth and color cameras
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Registration {
    ir: IrCameraParams,
    color: ColorCameraParams,
}

impl Registration {
    pub fn new(ir: IrCameraParams, color: ColorCameraParams) -> Self {
        Self { ir, color }
    }

    pub fn ir_params(&self) -> &IrCameraParams {
        &self.ir
    }

    pub fn color_params(&self) -> &ColorCameraParams {
        &self.color
    }

    /// Unproject a depth pixel into camera space.
    ///
    /// `depth_mm` is the raw depth sample at (`row`, `col`). Returns the point
    /// in metres, or `None` for missing or non-finite readings.
    pub fn point_xyz(&self, row: u32, col: u32, depth_mm: f32) -> Option<[f32; 3]> {
        let z = depth_mm / 1000.0;
        if !z.is_finite() || z <= MIN_VALID_DEPTH_M {
            return None;
        }

        let x = (col as f32 + 0.5 - self.ir.cx) * z / self.ir.fx;
        let y = (row as f32 + 0.5 - self.ir.cy) * z / self.ir.fy;
        Some([x, y, z])
    }
}
