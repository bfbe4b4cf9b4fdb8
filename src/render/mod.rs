// SPDX-License-Identifier: GPL-3.0-only

//! Display surface abstraction
//!
//! Three fixed-size textures mirror the latest depth, infrared and color
//! frames. They are drawn as unlit rectangles on a 1024x848 canvas:
//!
//! ```text
//! (0,0)            (512,0)          (1024,0)
//!   ┌────────────────┬────────────────┐
//!   │ depth (flipped)│ infrared       │
//!   ├────────────────┼────────────────┘ (1024,424)
//!   │ color          │
//!   └────────────────┘ (512,848)
//! ```

mod wgpu_renderer;

pub use wgpu_renderer::WgpuRenderer;

use crate::constants::{
    COLOR_HEIGHT, COLOR_PIXEL_BYTES, COLOR_WIDTH, DEPTH_HEIGHT, DEPTH_WIDTH, FLOAT_SAMPLE_BYTES,
    WINDOW_HEIGHT, WINDOW_WIDTH,
};
use crate::errors::RenderError;
use crate::shaders::QuadParams;

/// One of the three display textures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Depth,
    Ir,
    Color,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 3] = [TextureSlot::Depth, TextureSlot::Ir, TextureSlot::Color];

    /// Fixed texture extent (width, height)
    pub fn extent(&self) -> (u32, u32) {
        match self {
            TextureSlot::Depth | TextureSlot::Ir => (DEPTH_WIDTH, DEPTH_HEIGHT),
            TextureSlot::Color => (COLOR_WIDTH, COLOR_HEIGHT),
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            TextureSlot::Depth | TextureSlot::Ir => FLOAT_SAMPLE_BYTES,
            TextureSlot::Color => COLOR_PIXEL_BYTES,
        }
    }

    /// Exact byte length an upload must have
    pub fn byte_len(&self) -> usize {
        let (width, height) = self.extent();
        width as usize * height as usize * self.bytes_per_pixel()
    }

    /// Depth and infrared textures carry a single float channel
    pub fn is_single_channel(&self) -> bool {
        matches!(self, TextureSlot::Depth | TextureSlot::Ir)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TextureSlot::Depth => "depth",
            TextureSlot::Ir => "infrared",
            TextureSlot::Color => "color",
        }
    }
}

/// Reject uploads whose size differs from the slot's fixed extent
pub fn check_upload_len(slot: TextureSlot, data: &[u8]) -> Result<(), RenderError> {
    let expected = slot.byte_len();
    if data.len() != expected {
        return Err(RenderError::UploadSize {
            slot: slot.label(),
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Where a texture lands on the canvas, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadPlacement {
    pub slot: TextureSlot,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub flip_y: bool,
}

impl QuadPlacement {
    /// Convert to clip-space parameters for a canvas of the given size
    pub fn to_params(&self, canvas_width: f32, canvas_height: f32) -> QuadParams {
        let left = self.x / canvas_width * 2.0 - 1.0;
        let right = (self.x + self.width) / canvas_width * 2.0 - 1.0;
        let top = 1.0 - self.y / canvas_height * 2.0;
        let bottom = 1.0 - (self.y + self.height) / canvas_height * 2.0;

        QuadParams::new(
            [left, top, right, bottom],
            self.flip_y,
            self.slot.is_single_channel(),
        )
    }
}

/// The fixed arrangement of the three textures
///
/// Depth is drawn flipped top-to-bottom to undo the driver's row order; the
/// color image is scaled down into a depth-sized cell.
pub fn display_layout() -> [QuadPlacement; 3] {
    let cell_w = DEPTH_WIDTH as f32;
    let cell_h = DEPTH_HEIGHT as f32;

    [
        QuadPlacement {
            slot: TextureSlot::Depth,
            x: 0.0,
            y: 0.0,
            width: cell_w,
            height: cell_h,
            flip_y: true,
        },
        QuadPlacement {
            slot: TextureSlot::Ir,
            x: cell_w,
            y: 0.0,
            width: cell_w,
            height: cell_h,
            flip_y: false,
        },
        QuadPlacement {
            slot: TextureSlot::Color,
            x: 0.0,
            y: cell_h,
            width: cell_w,
            height: cell_h,
            flip_y: false,
        },
    ]
}

/// Canvas size the layout is expressed in
pub fn canvas_size() -> (f32, f32) {
    (WINDOW_WIDTH as f32, WINDOW_HEIGHT as f32)
}

/// Rendering collaborator of the capture loop
///
/// Implementations must keep texture extents fixed for their lifetime and
/// turn draws into no-ops while no shader is available.
pub trait Renderer {
    /// Create the three display textures (blank)
    fn allocate_textures(&mut self) -> Result<(), RenderError>;

    /// Compile the pass-through program
    fn compile_shader(&mut self) -> Result<(), RenderError>;

    /// Overwrite a texture's contents; `data` must be exactly `slot.byte_len()`
    fn upload(&mut self, slot: TextureSlot, data: &[u8]) -> Result<(), RenderError>;

    /// Draw all quads and present
    fn draw(&mut self) -> Result<(), RenderError>;
}
