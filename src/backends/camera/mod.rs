// SPDX-License-Identifier: GPL-3.0-only

//! Camera driver abstraction
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ CaptureDisplayLoop   │  ← display thread
//! └──────────┬───────────┘
//!            │ open / start / stop / close
//!            ▼
//! ┌──────────────────────┐        ┌──────────────────────┐
//! │ DepthDriver          │ ─────► │ DepthDevice          │
//! └──────────────────────┘        └──────────┬───────────┘
//!                                            │ on_new_frame (driver thread)
//!                                            ▼
//!                                 ┌──────────────────────┐
//!                                 │ SyncFrameListener    │ ◄── wait / release
//!                                 └──────────────────────┘
//! ```

pub mod frame_loop;
pub mod listener;
pub mod registration;
pub mod types;

pub use listener::{FrameListener, ListenerStats, SyncFrameListener};
pub use registration::Registration;
pub use types::*;

use std::sync::Arc;

/// Entry point of a camera driver
///
/// Mirrors the lifecycle of a USB depth camera context: enumerate, pick a
/// serial, open with an optional pipeline backend.
pub trait DepthDriver: Send {
    /// Rescan the bus and return the number of connected devices
    fn enumerate_devices(&mut self) -> usize;

    /// Devices found by the last enumeration
    fn devices(&self) -> Vec<DeviceDescriptor>;

    /// Serial of the first enumerated device
    fn default_device_serial(&self) -> Option<String>;

    /// Whether this build of the driver can decode with `backend`
    fn supports_pipeline(&self, backend: PipelineBackend) -> bool;

    /// Open a device by serial.
    ///
    /// `None` lets the driver pick its default pipeline backend.
    fn open_device(
        &mut self,
        serial: &str,
        pipeline: Option<PipelineBackend>,
    ) -> BackendResult<Box<dyn DepthDevice>>;
}

/// An open camera device
pub trait DepthDevice: Send {
    fn serial_number(&self) -> String;

    fn firmware_version(&self) -> String;

    /// Pipeline backend the device decodes with
    fn pipeline(&self) -> PipelineBackend;

    /// Receiver for color frames
    fn set_color_frame_listener(&mut self, listener: Arc<dyn FrameListener>);

    /// Receiver for infrared and depth frames
    fn set_ir_and_depth_frame_listener(&mut self, listener: Arc<dyn FrameListener>);

    /// Start streaming to the registered listeners
    fn start(&mut self) -> BackendResult<()>;

    /// Stop streaming; the device stays open
    fn stop(&mut self) -> BackendResult<()>;

    /// Release the device
    fn close(&mut self) -> BackendResult<()>;

    fn ir_camera_params(&self) -> IrCameraParams;

    fn color_camera_params(&self) -> ColorCameraParams;
}
