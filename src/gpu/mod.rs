// SPDX-License-Identifier: GPL-3.0-only

//! GPU initialization utilities for the display surface.

use crate::errors::RenderError;
use std::sync::Arc;
use tracing::{debug, info};

pub use wgpu;

/// Information about the created GPU device
#[derive(Debug)]
pub struct GpuDeviceInfo {
    /// Name of the GPU adapter
    pub adapter_name: String,
    /// Graphics API the adapter runs on
    pub backend: wgpu::Backend,
}

/// Create the wgpu instance shared by the surface and the device
pub fn create_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    })
}

/// Pick an adapter able to present to `surface` and open a device on it.
///
/// Passing `None` requests a headless device.
pub async fn create_display_device(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
    label: &str,
) -> Result<(wgpu::Adapter, Arc<wgpu::Device>, Arc<wgpu::Queue>, GpuDeviceInfo), RenderError> {
    info!(label = label, "Creating GPU device for display");

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| RenderError::DeviceUnavailable(e.to_string()))?;

    let adapter_info = adapter.get_info();
    info!(
        adapter = %adapter_info.name,
        backend = ?adapter_info.backend,
        "GPU adapter selected for display"
    );

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some(label),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            memory_hints: wgpu::MemoryHints::Performance,
            ..Default::default()
        })
        .await
        .map_err(|e| RenderError::DeviceUnavailable(format!("Failed to create GPU device: {}", e)))?;

    debug!(label = label, "GPU device ready");

    let info = GpuDeviceInfo {
        adapter_name: adapter_info.name.clone(),
        backend: adapter_info.backend,
    };

    Ok((adapter, Arc::new(device), Arc::new(queue), info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_headless_device() {
        // Needs a GPU adapter; passes trivially without one
        let instance = create_instance();
        match pollster::block_on(create_display_device(&instance, None, "test_device")) {
            Ok((_adapter, device, _queue, info)) => {
                println!("Display device on {} ({:?})", info.adapter_name, info.backend);
                // The color texture must fit
                assert!(device.limits().max_texture_dimension_2d >= 1920);
            }
            Err(e) => println!("No adapter available, skipping: {}", e),
        }
    }
}
