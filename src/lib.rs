// SPDX-License-Identifier: GPL-3.0-only

//! Depth Viewer - live display of a depth camera's color, infrared and depth streams
//!
//! # Architecture
//!
//! - [`backends`]: Camera driver abstraction, frame hand-off and the synthetic driver
//! - [`viewer`]: Capture-and-display loop and frame normalization
//! - [`render`]: Display textures, quad layout and the wgpu renderer
//! - [`shaders`]: Pass-through shader and factory intrinsics
//! - [`gpu`]: wgpu instance and device creation
//! - [`app`]: winit application driving the loop
//! - [`config`]: User configuration handling

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gpu;
pub mod render;
pub mod shaders;
pub mod viewer;

// Re-export commonly used types
pub use app::ViewerApp;
pub use config::Config;
pub use viewer::{CancellationToken, CaptureDisplayLoop, LoopConfig, StreamState, TickOutcome};
