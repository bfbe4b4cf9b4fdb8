// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic depth camera driver
//!
//! Behaves like a Kinect v2 on the USB bus: a configurable number of devices,
//! a configurable set of decodable pipeline backends, factory intrinsics, and
//! a background acquisition thread streaming color, infrared and depth test
//! patterns at a fixed rate.

pub mod patterns;

use crate::backends::camera::frame_loop::{AcquisitionLoop, LoopAction};
use crate::backends::camera::{
    BackendError, BackendResult, ColorCameraParams, DepthDevice, DepthDriver, DeviceDescriptor,
    FrameKind, FrameListener, IrCameraParams, PipelineBackend,
};
use crate::constants::DEFAULT_SIMULATED_FRAME_RATE;
use crate::shaders::kinect_intrinsics;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Firmware string reported by every synthetic device
pub const SYNTHETIC_FIRMWARE: &str = "synthetic-2.3";

/// Settings for the synthetic driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticConfig {
    /// Number of devices reported by enumeration
    pub devices: usize,
    /// Pipeline backends the driver claims to support
    pub pipelines: Vec<PipelineBackend>,
    /// Acquisition rate in frame sets per second
    pub frame_rate: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            devices: 1,
            pipelines: PipelineBackend::ALL.to_vec(),
            frame_rate: DEFAULT_SIMULATED_FRAME_RATE,
        }
    }
}

/// Driver context for synthetic devices
pub struct SyntheticDriver {
    config: SyntheticConfig,
    enumerated: Vec<DeviceDescriptor>,
}

impl SyntheticDriver {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            enumerated: Vec::new(),
        }
    }

    /// Serial assigned to the device at `index`
    pub fn serial_for(index: usize) -> String {
        format!("SYN{:09}", index + 1)
    }
}

impl DepthDriver for SyntheticDriver {
    fn enumerate_devices(&mut self) -> usize {
        self.enumerated = (0..self.config.devices)
            .map(|index| DeviceDescriptor {
                serial: Self::serial_for(index),
                firmware: SYNTHETIC_FIRMWARE.to_string(),
                name: format!("Synthetic Kinect v2 #{}", index),
            })
            .collect();

        debug!(count = self.enumerated.len(), "Enumerated synthetic devices");
        self.enumerated.len()
    }

    fn devices(&self) -> Vec<DeviceDescriptor> {
        self.enumerated.clone()
    }

    fn default_device_serial(&self) -> Option<String> {
        self.enumerated.first().map(|d| d.serial.clone())
    }

    fn supports_pipeline(&self, backend: PipelineBackend) -> bool {
        self.config.pipelines.contains(&backend)
    }

    fn open_device(
        &mut self,
        serial: &str,
        pipeline: Option<PipelineBackend>,
    ) -> BackendResult<Box<dyn DepthDevice>> {
        let descriptor = self
            .enumerated
            .iter()
            .find(|d| d.serial == serial)
            .cloned()
            .ok_or_else(|| BackendError::DeviceNotFound(serial.to_string()))?;

        let pipeline = match pipeline {
            Some(backend) if !self.supports_pipeline(backend) => {
                return Err(BackendError::OpenFailed(format!(
                    "{} pipeline not available",
                    backend
                )));
            }
            Some(backend) => backend,
            // Driver default: first decodable backend, CPU as the last resort
            None => self
                .config
                .pipelines
                .first()
                .copied()
                .unwrap_or(PipelineBackend::Cpu),
        };

        info!(serial = %serial, pipeline = %pipeline, "Opened synthetic device");

        Ok(Box::new(SyntheticDevice {
            descriptor,
            pipeline,
            frame_rate: self.config.frame_rate,
            color_listener: None,
            ir_depth_listener: None,
            acquisition: None,
            closed: false,
        }))
    }
}

/// An open synthetic device
pub struct SyntheticDevice {
    descriptor: DeviceDescriptor,
    pipeline: PipelineBackend,
    frame_rate: u32,
    color_listener: Option<Arc<dyn FrameListener>>,
    ir_depth_listener: Option<Arc<dyn FrameListener>>,
    acquisition: Option<AcquisitionLoop>,
    closed: bool,
}

impl SyntheticDevice {
    fn frame_period(&self) -> Duration {
        if self.frame_rate == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / self.frame_rate
        }
    }
}

impl DepthDevice for SyntheticDevice {
    fn serial_number(&self) -> String {
        self.descriptor.serial.clone()
    }

    fn firmware_version(&self) -> String {
        self.descriptor.firmware.clone()
    }

    fn pipeline(&self) -> PipelineBackend {
        self.pipeline
    }

    fn set_color_frame_listener(&mut self, listener: Arc<dyn FrameListener>) {
        self.color_listener = Some(listener);
    }

    fn set_ir_and_depth_frame_listener(&mut self, listener: Arc<dyn FrameListener>) {
        self.ir_depth_listener = Some(listener);
    }

    fn start(&mut self) -> BackendResult<()> {
        if self.closed {
            return Err(BackendError::Closed);
        }
        if self.acquisition.is_some() {
            return Ok(());
        }
        if self.color_listener.is_none() && self.ir_depth_listener.is_none() {
            warn!(serial = %self.descriptor.serial, "Starting stream without listeners");
        }

        let color = self.color_listener.clone();
        let ir_depth = self.ir_depth_listener.clone();
        let name = format!("synthetic-{}", self.descriptor.serial);

        self.acquisition = Some(AcquisitionLoop::start(
            &name,
            self.frame_period(),
            move |cycle| {
                if let Some(listener) = &ir_depth {
                    listener.on_new_frame(FrameKind::Ir, patterns::ir_frame(cycle));
                    listener.on_new_frame(FrameKind::Depth, patterns::depth_frame(cycle));
                }
                if let Some(listener) = &color {
                    listener.on_new_frame(FrameKind::Color, patterns::color_frame(cycle));
                }
                LoopAction::Continue
            },
        ));

        info!(serial = %self.descriptor.serial, "Synthetic stream started");
        Ok(())
    }

    fn stop(&mut self) -> BackendResult<()> {
        if self.closed {
            return Err(BackendError::Closed);
        }
        if let Some(mut acquisition) = self.acquisition.take() {
            acquisition.stop();
            info!(serial = %self.descriptor.serial, "Synthetic stream stopped");
        }
        Ok(())
    }

    fn close(&mut self) -> BackendResult<()> {
        if self.closed {
            return Err(BackendError::Closed);
        }
        if let Some(mut acquisition) = self.acquisition.take() {
            acquisition.stop();
        }
        self.color_listener = None;
        self.ir_depth_listener = None;
        self.closed = true;
        debug!(serial = %self.descriptor.serial, "Synthetic device closed");
        Ok(())
    }

    fn ir_camera_params(&self) -> IrCameraParams {
        kinect_intrinsics::factory_ir_params()
    }

    fn color_camera_params(&self) -> ColorCameraParams {
        kinect_intrinsics::factory_color_params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_reports_configured_devices() {
        let mut driver = SyntheticDriver::new(SyntheticConfig {
            devices: 2,
            ..Default::default()
        });
        assert_eq!(driver.default_device_serial(), None);
        assert_eq!(driver.enumerate_devices(), 2);
        assert_eq!(
            driver.default_device_serial().as_deref(),
            Some("SYN000000001")
        );
        assert_eq!(driver.devices()[1].serial, "SYN000000002");
    }

    #[test]
    fn test_open_unknown_serial_fails() {
        let mut driver = SyntheticDriver::new(SyntheticConfig::default());
        driver.enumerate_devices();
        assert!(matches!(
            driver.open_device("nope", None),
            Err(BackendError::DeviceNotFound(_))
        ));
    }

    #[test]
    fn test_open_unsupported_pipeline_fails() {
        let mut driver = SyntheticDriver::new(SyntheticConfig {
            pipelines: vec![PipelineBackend::Cpu],
            ..Default::default()
        });
        driver.enumerate_devices();
        let serial = driver.default_device_serial().unwrap();

        assert!(!driver.supports_pipeline(PipelineBackend::OpenCl));
        assert!(driver
            .open_device(&serial, Some(PipelineBackend::OpenCl))
            .is_err());

        let device = driver.open_device(&serial, None).unwrap();
        assert_eq!(device.pipeline(), PipelineBackend::Cpu);
    }

    #[test]
    fn test_closed_device_rejects_lifecycle_calls() {
        let mut driver = SyntheticDriver::new(SyntheticConfig::default());
        driver.enumerate_devices();
        let serial = driver.default_device_serial().unwrap();
        let mut device = driver.open_device(&serial, None).unwrap();

        device.close().unwrap();
        assert_eq!(device.start(), Err(BackendError::Closed));
        assert_eq!(device.close(), Err(BackendError::Closed));
    }
}
