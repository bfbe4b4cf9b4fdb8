// SPDX-License-Identifier: GPL-3.0-only
//! Shader sources and parameter blocks
//!
//! The viewer uses a single pass-through program: it places a textured quad
//! and returns the sampled texel unchanged. It is compiled once at setup.

pub mod common;
pub mod kinect_intrinsics;

pub use common::QuadParams;

/// Pass-through vertex/fragment shader
pub const PASSTHROUGH_SHADER: &str = include_str!("passthrough.wgsl");

/// Vertex entry point of [`PASSTHROUGH_SHADER`]
pub const VERTEX_ENTRY: &str = "vs_main";
/// Fragment entry point of [`PASSTHROUGH_SHADER`]
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[cfg(test)]
mod tests {
    use super::*;

    /// Validate that a WGSL shader compiles successfully using naga
    fn validate_shader(name: &str, source: &str) -> naga::Module {
        let module = match naga::front::wgsl::parse_str(source) {
            Ok(module) => module,
            Err(e) => panic!("Shader '{}' parse failed: {:?}", name, e),
        };

        if let Err(e) = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        {
            panic!("Shader '{}' validation failed: {:?}", name, e);
        }

        module
    }

    #[test]
    fn test_passthrough_shader_validates() {
        validate_shader("passthrough", PASSTHROUGH_SHADER);
    }

    #[test]
    fn test_passthrough_entry_points() {
        let module = validate_shader("passthrough", PASSTHROUGH_SHADER);
        let names: Vec<&str> = module
            .entry_points
            .iter()
            .map(|ep| ep.name.as_str())
            .collect();
        assert!(names.contains(&VERTEX_ENTRY));
        assert!(names.contains(&FRAGMENT_ENTRY));
    }
}
