// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end tests running the capture loop against the synthetic driver

use depth_viewer::backends::camera::{
    BackendError, DepthDriver, FrameKind, FramePixelFormat, PipelineBackend, SyncFrameListener,
};
use depth_viewer::backends::synthetic::{SYNTHETIC_FIRMWARE, SyntheticConfig, SyntheticDriver};
use depth_viewer::constants::{COLOR_HEIGHT, COLOR_WIDTH, DEPTH_HEIGHT, DEPTH_WIDTH};
use depth_viewer::errors::RenderError;
use depth_viewer::render::{Renderer, TextureSlot, check_upload_len};
use depth_viewer::{CancellationToken, CaptureDisplayLoop, LoopConfig, StreamState, TickOutcome};
use std::sync::Arc;

#[derive(Default)]
struct CountingRenderer {
    uploads: usize,
    draws: usize,
}

impl Renderer for CountingRenderer {
    fn allocate_textures(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn compile_shader(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn upload(&mut self, slot: TextureSlot, data: &[u8]) -> Result<(), RenderError> {
        check_upload_len(slot, data)?;
        self.uploads += 1;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), RenderError> {
        self.draws += 1;
        Ok(())
    }
}

#[test]
fn test_synthetic_frames_match_sensor_geometry() {
    let mut driver = SyntheticDriver::new(SyntheticConfig {
        frame_rate: 120,
        ..Default::default()
    });
    assert_eq!(driver.enumerate_devices(), 1);
    let serial = driver.default_device_serial().unwrap();
    let mut device = driver.open_device(&serial, None).unwrap();
    assert_eq!(device.firmware_version(), SYNTHETIC_FIRMWARE);

    let listener = Arc::new(SyncFrameListener::new(&FrameKind::ALL));
    device.set_color_frame_listener(listener.clone());
    device.set_ir_and_depth_frame_listener(listener.clone());
    device.start().unwrap();

    let frames = listener.wait_for_new_frame().unwrap();
    let depth = frames.get(FrameKind::Depth).unwrap();
    let ir = frames.get(FrameKind::Ir).unwrap();
    let color = frames.get(FrameKind::Color).unwrap();

    assert_eq!((depth.width, depth.height), (DEPTH_WIDTH, DEPTH_HEIGHT));
    assert_eq!(depth.format, FramePixelFormat::Float);
    assert_eq!(depth.data.len(), depth.expected_len());
    assert_eq!((ir.width, ir.height), (DEPTH_WIDTH, DEPTH_HEIGHT));
    assert_eq!((color.width, color.height), (COLOR_WIDTH, COLOR_HEIGHT));
    assert_eq!(color.format, FramePixelFormat::Bgrx);
    listener.release(frames);

    device.stop().unwrap();
    device.close().unwrap();
    assert_eq!(device.start(), Err(BackendError::Closed));
}

#[test]
fn test_viewer_streams_from_synthetic_driver() {
    let driver = SyntheticDriver::new(SyntheticConfig {
        frame_rate: 120,
        ..Default::default()
    });
    let mut viewer = CaptureDisplayLoop::new(
        Box::new(driver),
        CountingRenderer::default(),
        LoopConfig::default(),
        CancellationToken::new(),
    );

    viewer.setup();
    assert_eq!(viewer.state(), StreamState::Streaming);

    for _ in 0..3 {
        assert_eq!(viewer.tick(), TickOutcome::Continue);
    }
    assert_eq!(viewer.renderer().draws, 3);
    assert_eq!(viewer.renderer().uploads, 9);

    let stats = viewer.listener_stats().unwrap();
    assert_eq!(stats.acquired, 3);
    assert_eq!(stats.released, 3);

    viewer.shutdown();
    assert_eq!(viewer.state(), StreamState::Uninitialized);
}

#[test]
fn test_paced_stream_delivers_frames() {
    let driver = SyntheticDriver::new(SyntheticConfig {
        frame_rate: 60,
        pipelines: vec![PipelineBackend::Cpu],
        ..Default::default()
    });
    let mut viewer = CaptureDisplayLoop::new(
        Box::new(driver),
        CountingRenderer::default(),
        LoopConfig::default(),
        CancellationToken::new(),
    );

    viewer.setup();
    viewer.tick();
    viewer.tick();
    assert_eq!(viewer.renderer().uploads, 6);
    viewer.shutdown();
}

#[test]
fn test_zero_devices_is_display_only() {
    let driver = SyntheticDriver::new(SyntheticConfig {
        devices: 0,
        ..Default::default()
    });
    let mut viewer = CaptureDisplayLoop::new(
        Box::new(driver),
        CountingRenderer::default(),
        LoopConfig::default(),
        CancellationToken::new(),
    );

    viewer.setup();
    assert!(!viewer.acquisition_enabled());
    assert_eq!(viewer.tick(), TickOutcome::Continue);
    assert_eq!(viewer.renderer().uploads, 0);
}
