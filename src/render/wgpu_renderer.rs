// SPDX-License-Identifier: GPL-3.0-only

//! wgpu implementation of the display surface

use super::{QuadPlacement, Renderer, TextureSlot, canvas_size, check_upload_len, display_layout};
use crate::errors::RenderError;
use crate::gpu::{self, wgpu};
use crate::shaders::{FRAGMENT_ENTRY, PASSTHROUGH_SHADER, QuadParams, VERTEX_ENTRY};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use winit::window::Window;

/// Texture format backing a slot
fn slot_format(slot: TextureSlot) -> wgpu::TextureFormat {
    match slot {
        TextureSlot::Depth | TextureSlot::Ir => wgpu::TextureFormat::R32Float,
        TextureSlot::Color => wgpu::TextureFormat::Bgra8Unorm,
    }
}

/// Pick a presentable format that stores shader output without sRGB encoding.
///
/// Prefers the first non-sRGB format the surface offers, otherwise strips the
/// sRGB suffix from the preferred one.
fn linear_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first().map(|f| f.remove_srgb_suffix()))
}

/// GPU resources of one drawn quad
struct QuadBinding {
    slot: TextureSlot,
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Renders the three display textures into a window surface
pub struct WgpuRenderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    target_format: wgpu::TextureFormat,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    quads: Vec<QuadBinding>,
    pipeline: Option<wgpu::RenderPipeline>,
}

impl WgpuRenderer {
    /// Create a surface for `window` and a device able to present to it
    pub fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let instance = gpu::create_instance();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        let (adapter, device, queue, gpu_info) = pollster::block_on(gpu::create_display_device(
            &instance,
            Some(&surface),
            "depth_viewer_display",
        ))?;

        let size = window.inner_size();
        let mut surface_config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or_else(|| RenderError::Surface("surface not supported by adapter".to_string()))?;
        let capabilities = surface.get_capabilities(&adapter);
        let target_format =
            linear_surface_format(&capabilities.formats).unwrap_or(surface_config.format);
        if capabilities.formats.contains(&target_format) {
            surface_config.format = target_format;
        } else {
            // sRGB-only surface: render through a linear view of it
            surface_config.view_formats.push(target_format);
        }
        surface.configure(&device, &surface_config);

        info!(
            adapter_name = %gpu_info.adapter_name,
            adapter_backend = ?gpu_info.backend,
            format = ?surface_config.format,
            target_format = ?target_format,
            width = surface_config.width,
            height = surface_config.height,
            "Display surface configured"
        );

        // R32Float is not filterable without an optional feature, so every
        // texture is bound as non-filterable and sampled with nearest filtering.
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quad_bind_group_layout"),
            entries: &[
                // Quad placement uniform
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Display texture
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quad_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("quad_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            window,
            surface,
            surface_config,
            target_format,
            device,
            queue,
            bind_group_layout,
            pipeline_layout,
            sampler,
            quads: Vec::new(),
            pipeline: None,
        })
    }

    /// Reconfigure the surface after the window changed size
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        debug!(width, height, "Surface reconfigured");
    }

    fn create_quad(&self, placement: &QuadPlacement) -> QuadBinding {
        let slot = placement.slot;
        let (width, height) = slot.extent();

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(slot.label()),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: slot_format(slot),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let (canvas_w, canvas_h) = canvas_size();
        let params: QuadParams = placement.to_params(canvas_w, canvas_h);
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quad_uniform_buffer"),
            size: std::mem::size_of::<QuadParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.queue
            .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&params));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quad_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        QuadBinding {
            slot,
            texture,
            bind_group,
        }
    }
}

impl Renderer for WgpuRenderer {
    fn allocate_textures(&mut self) -> Result<(), RenderError> {
        self.quads = display_layout()
            .iter()
            .map(|placement| self.create_quad(placement))
            .collect();
        debug!(count = self.quads.len(), "Display textures allocated");
        Ok(())
    }

    fn compile_shader(&mut self) -> Result<(), RenderError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("passthrough_shader"),
                source: wgpu::ShaderSource::Wgsl(PASSTHROUGH_SHADER.into()),
            });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("passthrough_pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some(VERTEX_ENTRY),
                    compilation_options: Default::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some(FRAGMENT_ENTRY),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.target_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            self.pipeline = None;
            return Err(RenderError::ShaderCompile(err.to_string()));
        }

        self.pipeline = Some(pipeline);
        info!("Pass-through shader compiled");
        Ok(())
    }

    fn upload(&mut self, slot: TextureSlot, data: &[u8]) -> Result<(), RenderError> {
        check_upload_len(slot, data)?;
        let quad = self
            .quads
            .iter()
            .find(|q| q.slot == slot)
            .ok_or(RenderError::TexturesNotAllocated)?;

        let (width, height) = slot.extent();
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &quad.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * slot.bytes_per_pixel() as u32),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    fn draw(&mut self) -> Result<(), RenderError> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                debug!("Surface acquire timed out, skipping frame");
                return Ok(());
            }
            Err(e) => {
                error!(error = %e, "Failed to acquire surface texture");
                return Err(RenderError::Surface(e.to_string()));
            }
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.target_format),
            ..Default::default()
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("display_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("display_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Without a compiled program the window stays cleared
            if let Some(pipeline) = &self.pipeline {
                pass.set_pipeline(pipeline);
                for quad in &self.quads {
                    pass.set_bind_group(0, &quad.bind_group, &[]);
                    pass.draw(0..4, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        frame.present();
        Ok(())
    }
}
