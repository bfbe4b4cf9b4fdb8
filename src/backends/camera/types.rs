// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera driver abstraction

//! Shared types for camera drivers

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Kind of image carried by a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// 1920x1080 color image
    Color,
    /// 512x424 infrared amplitude image
    Ir,
    /// 512x424 depth image in millimetres
    Depth,
}

impl FrameKind {
    /// Every kind a synchronized frame set carries
    pub const ALL: [FrameKind; 3] = [FrameKind::Color, FrameKind::Ir, FrameKind::Depth];
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameKind::Color => write!(f, "color"),
            FrameKind::Ir => write!(f, "infrared"),
            FrameKind::Depth => write!(f, "depth"),
        }
    }
}

/// Pixel layout of a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePixelFormat {
    /// One native-endian `f32` per pixel
    Float,
    /// 8-bit blue, green, red, unused
    Bgrx,
}

impl FramePixelFormat {
    /// Bytes occupied by one pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            FramePixelFormat::Float | FramePixelFormat::Bgrx => 4,
        }
    }
}

impl std::fmt::Display for FramePixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FramePixelFormat::Float => write!(f, "Float"),
            FramePixelFormat::Bgrx => write!(f, "BGRX"),
        }
    }
}

/// A single image delivered by the driver
#[derive(Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub format: FramePixelFormat,
    pub data: Vec<u8>,
    /// Monotonic acquisition counter assigned by the driver
    pub sequence: u64,
    pub captured_at: Instant,
}

impl Frame {
    /// Byte length implied by the frame geometry
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("data", &format_args!("{} bytes", self.data.len()))
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// One synchronized batch of frames, keyed by kind
///
/// Handed out by [`SyncFrameListener::wait_for_new_frame`] and given back
/// through [`SyncFrameListener::release`].
///
/// [`SyncFrameListener::wait_for_new_frame`]: super::SyncFrameListener::wait_for_new_frame
/// [`SyncFrameListener::release`]: super::SyncFrameListener::release
#[derive(Debug, Default)]
pub struct FrameSet {
    frames: HashMap<FrameKind, Frame>,
}

impl FrameSet {
    pub(crate) fn from_map(frames: HashMap<FrameKind, Frame>) -> Self {
        Self { frames }
    }

    /// Get the frame of a given kind
    pub fn get(&self, kind: FrameKind) -> Option<&Frame> {
        self.frames.get(&kind)
    }

    /// Number of frames in the set
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Processing strategy the driver uses to turn raw sensor packets into frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineBackend {
    /// Software decoding on the CPU
    Cpu,
    /// OpenGL shader decoding
    #[serde(rename = "opengl")]
    OpenGl,
    /// OpenCL compute decoding
    #[serde(rename = "opencl")]
    OpenCl,
}

impl PipelineBackend {
    pub const ALL: [PipelineBackend; 3] = [
        PipelineBackend::Cpu,
        PipelineBackend::OpenGl,
        PipelineBackend::OpenCl,
    ];
}

impl std::fmt::Display for PipelineBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineBackend::Cpu => write!(f, "CPU"),
            PipelineBackend::OpenGl => write!(f, "OpenGL"),
            PipelineBackend::OpenCl => write!(f, "OpenCL"),
        }
    }
}

impl std::str::FromStr for PipelineBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(PipelineBackend::Cpu),
            "gl" | "opengl" => Ok(PipelineBackend::OpenGl),
            "cl" | "opencl" => Ok(PipelineBackend::OpenCl),
            other => Err(format!("unknown pipeline backend '{}'", other)),
        }
    }
}

/// Enumerated device as reported by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub serial: String,
    pub firmware: String,
    pub name: String,
}

/// Depth (infrared) camera intrinsics and radial/tangential distortion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrCameraParams {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
    pub k1: f32,
    pub k2: f32,
    pub k3: f32,
    pub p1: f32,
    pub p2: f32,
}

/// Color camera intrinsics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorCameraParams {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

/// Result type for driver operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Camera driver errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// No device with the requested serial
    DeviceNotFound(String),
    /// Device could not be opened
    OpenFailed(String),
    /// Streaming could not be started
    StartFailed(String),
    /// Operation on a device that was already closed
    Closed,
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::DeviceNotFound(serial) => write!(f, "Device not found: {}", serial),
            BackendError::OpenFailed(msg) => write!(f, "Failed to open device: {}", msg),
            BackendError::StartFailed(msg) => write!(f, "Failed to start streaming: {}", msg),
            BackendError::Closed => write!(f, "Device is closed"),
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_backend_parse() {
        assert_eq!("cpu".parse::<PipelineBackend>(), Ok(PipelineBackend::Cpu));
        assert_eq!("GL".parse::<PipelineBackend>(), Ok(PipelineBackend::OpenGl));
        assert_eq!("opencl".parse::<PipelineBackend>(), Ok(PipelineBackend::OpenCl));
        assert!("cuda".parse::<PipelineBackend>().is_err());
    }

    #[test]
    fn test_frame_expected_len() {
        let frame = Frame {
            width: 512,
            height: 424,
            format: FramePixelFormat::Float,
            data: Vec::new(),
            sequence: 0,
            captured_at: Instant::now(),
        };
        assert_eq!(frame.expected_len(), 512 * 424 * 4);
    }
}
