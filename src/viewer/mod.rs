// SPDX-License-Identifier: GPL-3.0-only

//! Capture-and-display loop
//!
//! Drives one depth camera and one display surface from a single thread:
//!
//! - [`CaptureDisplayLoop::setup`] opens the device and prepares textures.
//! - [`CaptureDisplayLoop::tick`] runs once per display refresh: wait for a
//!   synchronized frame set, normalize, upload, release, draw.
//! - [`CaptureDisplayLoop::shutdown`] stops and closes the device.
//!
//! Every failure on the driver side lands in [`StreamState::DisplayOnly`]:
//! the window keeps drawing whatever the textures hold and the process never
//! aborts because of the camera.

pub mod cancel;
pub mod normalize;

pub use cancel::CancellationToken;
pub use normalize::{FrameView, normalize};

use crate::backends::camera::{
    DepthDevice, DepthDriver, FrameKind, FrameListener, FramePixelFormat, FrameSet,
    ListenerStats, PipelineBackend, Registration, SyncFrameListener,
};
use crate::constants::{COLOR_HEIGHT, COLOR_WIDTH, DEPTH_HEIGHT, DEPTH_WIDTH};
use crate::errors::{AppResult, FrameError};
use crate::render::{Renderer, TextureSlot};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Acquisition settings resolved from configuration and command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    /// Preferred pipeline backend
    pub pipeline: PipelineBackend,
    /// Device to open; `None` picks the driver's default device
    pub serial: Option<String>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineBackend::OpenCl,
            serial: None,
        }
    }
}

/// Why acquisition is disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOnlyReason {
    /// Enumeration found no device
    NoDevice,
    /// The driver could not open the device
    OpenFailed,
    /// The device opened but would not stream
    StartFailed,
}

/// Observable lifecycle state of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Uninitialized,
    DisplayOnly(DisplayOnlyReason),
    Streaming,
}

/// What the caller should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Exit,
}

/// Resources owned while the device streams
struct StreamingSession {
    device: Box<dyn DepthDevice>,
    listener: Arc<SyncFrameListener>,
    // Built from the device intrinsics; not consulted while drawing
    registration: Registration,
}

enum LoopState {
    Uninitialized,
    DisplayOnly(DisplayOnlyReason),
    Streaming(StreamingSession),
}

/// Single-threaded acquisition and display loop
pub struct CaptureDisplayLoop<R: Renderer> {
    driver: Box<dyn DepthDriver>,
    renderer: R,
    config: LoopConfig,
    cancel: CancellationToken,
    state: LoopState,
}

impl<R: Renderer> CaptureDisplayLoop<R> {
    pub fn new(
        driver: Box<dyn DepthDriver>,
        renderer: R,
        config: LoopConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            driver,
            renderer,
            config,
            cancel,
            state: LoopState::Uninitialized,
        }
    }

    /// Open the camera and prepare the display.
    ///
    /// Never fails: driver problems leave the loop in `DisplayOnly`, shader
    /// problems leave the window blank.
    pub fn setup(&mut self) {
        if !matches!(self.state, LoopState::Uninitialized) {
            warn!(state = ?self.state(), "Setup called twice, ignoring");
            return;
        }

        self.state = self.start_acquisition();

        if let Err(e) = self.renderer.allocate_textures() {
            error!(error = %e, "Failed to allocate display textures");
        }
        if let Err(e) = self.renderer.compile_shader() {
            error!(error = %e, "Pass-through shader unavailable, continuing without output");
        }

        info!(state = ?self.state(), "Setup complete");
    }

    fn start_acquisition(&mut self) -> LoopState {
        let count = self.driver.enumerate_devices();
        if count == 0 {
            warn!("No depth camera connected, running display-only");
            return LoopState::DisplayOnly(DisplayOnlyReason::NoDevice);
        }
        debug!(count, "Depth cameras found");

        let serial = match self
            .config
            .serial
            .clone()
            .or_else(|| self.driver.default_device_serial())
        {
            Some(serial) => serial,
            None => {
                warn!("Driver reported devices but no default serial");
                return LoopState::DisplayOnly(DisplayOnlyReason::NoDevice);
            }
        };

        let requested = self.config.pipeline;
        let pipeline = if self.driver.supports_pipeline(requested) {
            Some(requested)
        } else {
            warn!(pipeline = %requested, "Pipeline backend not supported, using driver default");
            None
        };

        let mut device = match self.driver.open_device(&serial, pipeline) {
            Ok(device) => device,
            Err(e) => {
                error!(serial = %serial, error = %e, "Failure opening device");
                return LoopState::DisplayOnly(DisplayOnlyReason::OpenFailed);
            }
        };

        let listener = Arc::new(SyncFrameListener::new(&FrameKind::ALL));
        let as_listener: Arc<dyn FrameListener> = listener.clone();
        device.set_color_frame_listener(Arc::clone(&as_listener));
        device.set_ir_and_depth_frame_listener(as_listener);

        if let Err(e) = device.start() {
            error!(serial = %serial, error = %e, "Failed to start streaming");
            if let Err(e) = device.close() {
                warn!(error = %e, "Failed to close device after start failure");
            }
            return LoopState::DisplayOnly(DisplayOnlyReason::StartFailed);
        }

        info!(
            serial = %device.serial_number(),
            firmware = %device.firmware_version(),
            pipeline = %device.pipeline(),
            "Device streaming"
        );

        let registration = Registration::new(device.ir_camera_params(), device.color_camera_params());

        LoopState::Streaming(StreamingSession {
            device,
            listener,
            registration,
        })
    }

    /// Run one display refresh.
    ///
    /// Blocks while streaming until the driver delivers a frame set.
    pub fn tick(&mut self) -> TickOutcome {
        if self.cancel.is_cancelled() {
            debug!("Cancellation observed, leaving display loop");
            return TickOutcome::Exit;
        }

        if let LoopState::Streaming(session) = &self.state {
            match session.listener.wait_for_new_frame() {
                Ok(frames) => {
                    if let Err(e) = upload_frame_set(&frames, &mut self.renderer) {
                        error!(error = %e, "Dropping frame set");
                    }
                    session.listener.release(frames);
                }
                Err(e) => error!(error = %e, "Frame set unavailable"),
            }
        }

        if let Err(e) = self.renderer.draw() {
            warn!(error = %e, "Draw failed");
        }

        TickOutcome::Continue
    }

    /// Stop streaming and release the device.
    ///
    /// Only touches the driver if acquisition was enabled. Best effort: errors
    /// are logged and not retried. Afterwards the loop is `Uninitialized`.
    pub fn shutdown(&mut self) {
        match std::mem::replace(&mut self.state, LoopState::Uninitialized) {
            LoopState::Streaming(mut session) => {
                if let Err(e) = session.device.stop() {
                    warn!(error = %e, "Failed to stop device");
                }
                if let Err(e) = session.device.close() {
                    warn!(error = %e, "Failed to close device");
                }

                let stats = session.listener.stats();
                info!(
                    acquired = stats.acquired,
                    released = stats.released,
                    replaced = stats.replaced,
                    "Device closed"
                );
            }
            LoopState::DisplayOnly(reason) => {
                debug!(reason = ?reason, "Shutdown without acquisition");
            }
            LoopState::Uninitialized => {}
        }
    }

    pub fn state(&self) -> StreamState {
        match &self.state {
            LoopState::Uninitialized => StreamState::Uninitialized,
            LoopState::DisplayOnly(reason) => StreamState::DisplayOnly(*reason),
            LoopState::Streaming(_) => StreamState::Streaming,
        }
    }

    pub fn acquisition_enabled(&self) -> bool {
        matches!(self.state, LoopState::Streaming(_))
    }

    /// Registration helper of the active session
    pub fn registration(&self) -> Option<&Registration> {
        match &self.state {
            LoopState::Streaming(session) => Some(&session.registration),
            _ => None,
        }
    }

    /// Hand-off counters of the active session
    pub fn listener_stats(&self) -> Option<ListenerStats> {
        match &self.state {
            LoopState::Streaming(session) => Some(session.listener.stats()),
            _ => None,
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

/// Validate all three frames, then upload them.
///
/// Nothing is uploaded unless every frame passes validation, so the textures
/// never mix two acquisition instants.
fn upload_frame_set<R: Renderer>(frames: &FrameSet, renderer: &mut R) -> AppResult<()> {
    let frame = |kind| frames.get(kind).ok_or(FrameError::MissingFrame(kind));

    let depth = FrameView::validate(
        FrameKind::Depth,
        frame(FrameKind::Depth)?,
        FramePixelFormat::Float,
        DEPTH_WIDTH,
        DEPTH_HEIGHT,
    )?;
    let ir = FrameView::validate(
        FrameKind::Ir,
        frame(FrameKind::Ir)?,
        FramePixelFormat::Float,
        DEPTH_WIDTH,
        DEPTH_HEIGHT,
    )?;
    let color = FrameView::validate(
        FrameKind::Color,
        frame(FrameKind::Color)?,
        FramePixelFormat::Bgrx,
        COLOR_WIDTH,
        COLOR_HEIGHT,
    )?;

    let depth_samples = depth.normalized();
    let ir_samples = ir.normalized();

    renderer.upload(TextureSlot::Ir, bytemuck::cast_slice(&ir_samples))?;
    renderer.upload(TextureSlot::Depth, bytemuck::cast_slice(&depth_samples))?;
    renderer.upload(TextureSlot::Color, color.bytes())?;
    Ok(())
}

impl std::fmt::Debug for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopState::Uninitialized => write!(f, "Uninitialized"),
            LoopState::DisplayOnly(reason) => write!(f, "DisplayOnly({:?})", reason),
            LoopState::Streaming(session) => {
                write!(f, "Streaming({})", session.device.serial_number())
            }
        }
    }
}
