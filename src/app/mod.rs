// SPDX-License-Identifier: GPL-3.0-only

//! Windowed viewer application
//!
//! Owns the winit window and drives the [`CaptureDisplayLoop`] from the event
//! loop: setup on the first resume, one tick per redraw, shutdown on close or
//! cancellation.

use crate::backends::camera::DepthDriver;
use crate::constants::{WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH};
use crate::render::WgpuRenderer;
use crate::viewer::{CancellationToken, CaptureDisplayLoop, LoopConfig, TickOutcome};
use std::sync::Arc;
use tracing::{debug, error, info};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Window, WindowId};

/// winit application running the capture-and-display loop
pub struct ViewerApp {
    driver: Option<Box<dyn DepthDriver>>,
    config: LoopConfig,
    cancel: CancellationToken,
    window: Option<Arc<Window>>,
    viewer: Option<CaptureDisplayLoop<WgpuRenderer>>,
}

impl ViewerApp {
    pub fn new(driver: Box<dyn DepthDriver>, config: LoopConfig, cancel: CancellationToken) -> Self {
        Self {
            driver: Some(driver),
            config,
            cancel,
            window: None,
            viewer: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) {
        let Some(driver) = self.driver.take() else {
            return;
        };

        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_resizable(false);

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!(error = %e, "Failed to create window");
                event_loop.exit();
                return;
            }
        };

        let renderer = match WgpuRenderer::new(Arc::clone(&window)) {
            Ok(renderer) => renderer,
            Err(e) => {
                error!(error = %e, "Failed to initialize renderer");
                event_loop.exit();
                return;
            }
        };

        let mut viewer =
            CaptureDisplayLoop::new(driver, renderer, self.config.clone(), self.cancel.clone());
        viewer.setup();

        window.request_redraw();
        self.window = Some(window);
        self.viewer = Some(viewer);
    }

    fn finish(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.shutdown();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        if self.viewer.is_none() {
            self.init(event_loop);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Window closed");
                self.cancel.cancel();
                self.finish(event_loop);
            }
            WindowEvent::Resized(size) => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.renderer_mut().resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(viewer) = self.viewer.as_mut() else {
                    return;
                };
                if viewer.tick() == TickOutcome::Exit {
                    self.finish(event_loop);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.cancel.is_cancelled() {
            debug!("Cancellation requested");
            self.finish(event_loop);
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.shutdown();
        }
    }
}
