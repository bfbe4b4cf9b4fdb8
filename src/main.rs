// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use depth_viewer::backends::camera::PipelineBackend;
use depth_viewer::backends::synthetic::SyntheticDriver;
use depth_viewer::{CancellationToken, Config, ViewerApp};
use std::path::PathBuf;
use tracing::{info, warn};
use winit::event_loop::EventLoop;

mod cli;

#[derive(Parser)]
#[command(name = "depth-viewer")]
#[command(about = "Live viewer for depth camera color, infrared and depth streams")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Depth decoding pipeline (cpu, opengl, opencl)
    #[arg(short, long, global = true)]
    pipeline: Option<PipelineBackend>,

    /// Serial number of the device to open
    #[arg(short, long, global = true)]
    serial: Option<String>,

    /// Number of simulated devices to report
    #[arg(short, long, global = true)]
    devices: Option<usize>,

    /// Config file path (default: ~/.config/depth-viewer/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available depth cameras
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=depth_viewer=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref());
    if let Some(pipeline) = cli.pipeline {
        config.pipeline = pipeline;
    }
    if let Some(serial) = cli.serial {
        config.serial = Some(serial);
    }
    if let Some(devices) = cli.devices {
        config.simulated_devices = devices;
    }

    let mut driver = SyntheticDriver::new(config.synthetic_config());

    match cli.command {
        Some(Commands::List) => cli::list_devices(&mut driver),
        None => run_viewer(driver, &config),
    }
}

fn run_viewer(driver: SyntheticDriver, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let cancel = CancellationToken::new();

    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Interrupt received, shutting down");
        handler_token.cancel();
    }) {
        warn!(error = %e, "Failed to install Ctrl+C handler");
    }

    let event_loop = EventLoop::new()?;
    let mut app = ViewerApp::new(Box::new(driver), config.loop_config(), cancel);
    event_loop.run_app(&mut app)?;

    info!("Depth viewer exiting");
    Ok(())
}
