// SPDX-License-Identifier: GPL-3.0-only

//! Validated frame views and sample normalization
//!
//! Raw driver buffers are only read after their format, geometry and byte
//! length have been checked against what the display textures expect.

use crate::backends::camera::{Frame, FrameKind, FramePixelFormat};
use crate::constants::NOMINAL_MAX_DEPTH_MM;
use crate::errors::FrameError;

/// Map a raw depth/infrared sample into the displayable range.
///
/// No clamping: samples beyond the nominal range land above 1.0.
#[inline]
pub fn normalize(sample: f32) -> f32 {
    sample / NOMINAL_MAX_DEPTH_MM
}

/// A frame whose buffer matches an expected layout
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    frame: &'a Frame,
}

impl<'a> FrameView<'a> {
    /// Check `frame` against the expected pixel format and dimensions
    pub fn validate(
        kind: FrameKind,
        frame: &'a Frame,
        format: FramePixelFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, FrameError> {
        if frame.format != format {
            return Err(FrameError::UnexpectedFormat {
                kind,
                format: frame.format.to_string(),
            });
        }
        if (frame.width, frame.height) != (width, height) {
            return Err(FrameError::DimensionMismatch {
                kind,
                expected: (width, height),
                actual: (frame.width, frame.height),
            });
        }

        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if frame.data.len() != expected {
            return Err(FrameError::LengthMismatch {
                kind,
                expected,
                actual: frame.data.len(),
            });
        }

        Ok(Self { frame })
    }

    /// The validated raw bytes
    pub fn bytes(&self) -> &'a [u8] {
        &self.frame.data
    }

    /// Samples of a `Float` frame in row order
    pub fn float_samples(&self) -> impl Iterator<Item = f32> + 'a {
        self.frame
            .data
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
    }

    /// Every sample divided by the nominal maximum range
    pub fn normalized(&self) -> Vec<f32> {
        self.float_samples().map(normalize).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn float_frame(width: u32, height: u32, samples: &[f32]) -> Frame {
        Frame {
            width,
            height,
            format: FramePixelFormat::Float,
            data: bytemuck::cast_slice(samples).to_vec(),
            sequence: 0,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_normalize_reference_points() {
        assert_eq!(normalize(0.0), 0.0);
        assert_eq!(normalize(4500.0), 1.0);
        assert_eq!(normalize(9000.0), 2.0);
        assert_eq!(normalize(2250.0), 0.5);
    }

    #[test]
    fn test_normalize_is_plain_division() {
        for x in [1.0f32, 123.456, 4499.9, 65535.0, -10.0] {
            assert_eq!(normalize(x), x / 4500.0);
        }
    }

    #[test]
    fn test_view_normalizes_every_sample() {
        let frame = float_frame(2, 2, &[0.0, 4500.0, 9000.0, 1125.0]);
        let view =
            FrameView::validate(FrameKind::Depth, &frame, FramePixelFormat::Float, 2, 2).unwrap();
        assert_eq!(view.normalized(), vec![0.0, 1.0, 2.0, 0.25]);
    }

    #[test]
    fn test_short_buffer_rejected() {
        let mut frame = float_frame(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        frame.data.truncate(12);
        let err = FrameView::validate(FrameKind::Ir, &frame, FramePixelFormat::Float, 2, 2)
            .unwrap_err();
        assert_eq!(
            err,
            FrameError::LengthMismatch {
                kind: FrameKind::Ir,
                expected: 16,
                actual: 12,
            }
        );
    }

    #[test]
    fn test_wrong_dimensions_rejected() {
        let frame = float_frame(2, 1, &[1.0, 2.0]);
        let err = FrameView::validate(FrameKind::Depth, &frame, FramePixelFormat::Float, 512, 424)
            .unwrap_err();
        assert!(matches!(err, FrameError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_wrong_format_rejected() {
        let frame = float_frame(1, 1, &[1.0]);
        let err = FrameView::validate(FrameKind::Color, &frame, FramePixelFormat::Bgrx, 1, 1)
            .unwrap_err();
        assert!(matches!(err, FrameError::UnexpectedFormat { .. }));
    }
}
