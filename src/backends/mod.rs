// SPDX-License-Identifier: GPL-3.0-only

//! Camera driver layer
//!
//! - [`camera`]: driver/device traits, frame types and the synchronized
//!   frame listener
//! - [`synthetic`]: simulated Kinect v2 driver streaming test patterns

pub mod camera;
pub mod synthetic;
