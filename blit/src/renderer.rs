// SPDX-FileCopyrightText: 2025 Contributors to the gst-blit project.
// SPDX-License-Identifier: Apache-2.0

//! Render pipeline drawing a [`VideoTexture`] onto the window surface.

use wgpu::util::DeviceExt;

use crate::VideoTexture;

/// Uniform block of `shaders/blit.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlitParams {
    /// Quad size relative to the surface (1.0, 1.0 fills it)
    pub scale: [f32; 2],

    /// Frame size in pixels, used by the YUY2 decode path
    pub frame_size: [f32; 2],

    /// Shader path, see [`crate::PixelFormat::shader_mode`]
    pub mode: u32,

    /// Padding to 32 bytes
    pub _padding: [u32; 3],
}

impl Default for BlitParams {
    fn default() -> Self {
        Self::stretch(1, 1, 0)
    }
}

impl BlitParams {
    /// Fills the whole surface regardless of aspect ratio.
    pub fn stretch(frame_width: u32, frame_height: u32, mode: u32) -> Self {
        Self {
            scale: [1.0, 1.0],
            frame_size: [frame_width as f32, frame_height as f32],
            mode,
            _padding: [0; 3],
        }
    }

    /// Largest centered quad with the frame's aspect ratio (letterbox or pillarbox).
    pub fn fit(
        frame_width: u32,
        frame_height: u32,
        surface_width: u32,
        surface_height: u32,
        mode: u32,
    ) -> Self {
        let mut params = Self::stretch(frame_width, frame_height, mode);
        if frame_width == 0 || frame_height == 0 || surface_width == 0 || surface_height == 0 {
            return params;
        }

        let frame_aspect = frame_width as f32 / frame_height as f32;
        let surface_aspect = surface_width as f32 / surface_height as f32;
        params.scale = if frame_aspect > surface_aspect {
            [1.0, surface_aspect / frame_aspect]
        } else {
            [frame_aspect / surface_aspect, 1.0]
        };
        params
    }
}

/// Pipeline, sampler and uniform buffer shared by every frame texture.
pub struct VideoRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    params_buffer: wgpu::Buffer,
    params: BlitParams,
}

impl VideoRenderer {
    /// Builds the render pipeline for a surface of `output_format`.
    pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blit.wgsl").into()),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Blit Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Blit Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blit Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: output_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let params = BlitParams::default();
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Blit Params Buffer"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            pipeline,
            bind_group_layout,
            sampler,
            params_buffer,
            params,
        }
    }

    pub fn params(&self) -> BlitParams {
        self.params
    }

    /// Writes new display parameters; no-op when unchanged.
    pub fn set_params(&mut self, queue: &wgpu::Queue, params: BlitParams) {
        if params == self.params {
            return;
        }
        self.params = params;
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&self.params));
    }

    /// Binds `texture` with the renderer's sampler and parameters.
    pub fn create_bind_group(&self, device: &wgpu::Device, texture: &VideoTexture) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blit Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.params_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Clears `output_view` to black, then draws the frame if there is one.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        output_view: &wgpu::TextureView,
        bind_group: Option<&wgpu::BindGroup>,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Blit Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output_view,
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

        if let Some(bind_group) = bind_group {
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, bind_group, &[]);
            render_pass.draw(0..6, 0..1);
        }
    }
}
