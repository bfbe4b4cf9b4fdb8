// SPDX-License-Identifier: GPL-3.0-only

//! Per-quad uniform block for the pass-through shader

/// Placement and sampling flags for one textured quad
///
/// Layout matches `QuadParams` in `passthrough.wgsl` (32 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadParams {
    /// Clip-space rectangle: left, top, right, bottom
    pub rect: [f32; 4],
    /// 1 = sample rows bottom-to-top
    pub flip_y: u32,
    /// 1 = texture holds a single channel, replicate it to gray
    pub single_channel: u32,
    pub _pad: [u32; 2],
}

impl QuadParams {
    pub fn new(rect: [f32; 4], flip_y: bool, single_channel: bool) -> Self {
        Self {
            rect,
            flip_y: flip_y as u32,
            single_channel: single_channel as u32,
            _pad: [0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size_matches_wgsl() {
        assert_eq!(std::mem::size_of::<QuadParams>(), 32);
    }

    #[test]
    fn test_flags_encoded_as_u32() {
        let params = QuadParams::new([-1.0, 1.0, 0.0, 0.0], true, false);
        assert_eq!(params.flip_y, 1);
        assert_eq!(params.single_channel, 0);
        assert_eq!(bytemuck::bytes_of(&params).len(), 32);
    }
}
