// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands that run without a window

use depth_viewer::backends::camera::{DepthDriver, PipelineBackend};

/// Print every device the driver enumerates
pub fn list_devices(driver: &mut dyn DepthDriver) -> Result<(), Box<dyn std::error::Error>> {
    let count = driver.enumerate_devices();
    if count == 0 {
        println!("No depth cameras found.");
        return Ok(());
    }

    let default_serial = driver.default_device_serial();
    let pipelines: Vec<String> = PipelineBackend::ALL
        .iter()
        .filter(|backend| driver.supports_pipeline(**backend))
        .map(|backend| backend.to_string())
        .collect();

    println!("Available depth cameras:");
    println!();
    for (index, device) in driver.devices().iter().enumerate() {
        let marker = if default_serial.as_deref() == Some(device.serial.as_str()) {
            " (default)"
        } else {
            ""
        };
        println!("  [{}] {}{}", index, device.name, marker);
        println!("      Serial:    {}", device.serial);
        println!("      Firmware:  {}", device.firmware);
        println!();
    }

    if pipelines.is_empty() {
        println!("Pipelines: none");
    } else {
        println!("Pipelines: {}", pipelines.join(", "));
    }

    Ok(())
}
