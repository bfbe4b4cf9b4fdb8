// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the depth viewer

use crate::backends::camera::FrameKind;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Error from the capture loop and configuration layers
#[derive(Debug)]
pub enum AppError {
    /// Rendering errors
    Render(RenderError),
    /// Frame validation errors
    Frame(FrameError),
    /// Configuration errors
    Config(String),
}

/// Frame validation and hand-off errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// A subscribed frame kind is missing from the frame set
    MissingFrame(FrameKind),
    /// Frame dimensions differ from the fixed sensor geometry
    DimensionMismatch {
        kind: FrameKind,
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// Byte length does not match width * height * bytes per pixel
    LengthMismatch {
        kind: FrameKind,
        expected: usize,
        actual: usize,
    },
    /// Frame pixel format cannot be viewed as requested
    UnexpectedFormat { kind: FrameKind, format: String },
    /// A previous frame set has not been released yet
    Outstanding,
}

/// Renderer errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// No suitable GPU adapter or device
    DeviceUnavailable(String),
    /// Surface creation or configuration failed
    Surface(String),
    /// Shader module or pipeline creation failed
    ShaderCompile(String),
    /// Upload size does not match the fixed texture extent
    UploadSize {
        slot: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Textures have not been allocated yet
    TexturesNotAllocated,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Render(e) => write!(f, "Render error: {}", e),
            AppError::Frame(e) => write!(f, "Frame error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::MissingFrame(kind) => write!(f, "{} frame missing from frame set", kind),
            FrameError::DimensionMismatch {
                kind,
                expected,
                actual,
            } => write!(
                f,
                "{} frame is {}x{}, expected {}x{}",
                kind, actual.0, actual.1, expected.0, expected.1
            ),
            FrameError::LengthMismatch {
                kind,
                expected,
                actual,
            } => write!(
                f,
                "{} frame holds {} bytes, expected {}",
                kind, actual, expected
            ),
            FrameError::UnexpectedFormat { kind, format } => {
                write!(f, "{} frame has unexpected format {}", kind, format)
            }
            FrameError::Outstanding => write!(f, "previous frame set was not released"),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::DeviceUnavailable(msg) => write!(f, "GPU unavailable: {}", msg),
            RenderError::Surface(msg) => write!(f, "Surface error: {}", msg),
            RenderError::ShaderCompile(msg) => write!(f, "Shader compilation failed: {}", msg),
            RenderError::UploadSize {
                slot,
                expected,
                actual,
            } => write!(
                f,
                "{} texture upload of {} bytes, expected {}",
                slot, actual, expected
            ),
            RenderError::TexturesNotAllocated => write!(f, "Display textures not allocated"),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for FrameError {}
impl std::error::Error for RenderError {}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Render(err)
    }
}

impl From<FrameError> for AppError {
    fn from(err: FrameError) -> Self {
        AppError::Frame(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Config(err.to_string())
    }
}
