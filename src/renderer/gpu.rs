//! wgpu implementation of [`RenderBackend`].
//!
//! Frames are drawn on top of whatever the target already holds (the host
//! draws its own content first), inside the frame's viewport. Textures are
//! sampled with nearest-neighbour filtering so pixel art stays crisp.

use std::collections::HashMap;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayout, Device, Extent3d, Queue, RenderPipeline, Sampler, Texture,
    TextureDimension, TextureFormat, TextureUsages, TextureView,
};

use crate::error::Result;
use crate::texture::{TextureHandle, TextureRecord};

use super::gpu_context::GpuContext;
use super::vertex::{fan_indices, ColorVertex, QuadVertex, QUAD_INDICES};
use super::{DrawCommand, Frame, RenderBackend};

const QUAD_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
}

@group(0) @binding(0) var t_texture: texture_2d<f32>;
@group(0) @binding(1) var s_texture: sampler;

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = vec4<f32>(in.position, 0.0, 1.0);
    out.uv = in.uv;
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(t_texture, s_texture, in.uv) * in.color;
}
"#;

const POLYGON_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = vec4<f32>(in.position, 0.0, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

struct GpuTexture {
    texture: Texture,
    bind_group: BindGroup,
}

struct RenderTarget {
    view: TextureView,
    width: u32,
    height: u32,
}

pub struct WgpuBackend {
    device: Arc<Device>,
    queue: Arc<Queue>,
    quad_pipeline: RenderPipeline,
    polygon_pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    sampler: Sampler,
    quad_index_buffer: wgpu::Buffer,
    textures: HashMap<TextureHandle, GpuTexture>,
    next_handle: u64,
    target: Option<RenderTarget>,
}

fn alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

fn create_pipeline(
    device: &Device,
    label: &str,
    source: &str,
    layout: &wgpu::PipelineLayout,
    buffer: wgpu::VertexBufferLayout<'static>,
    format: TextureFormat,
) -> RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[buffer],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(alpha_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

impl WgpuBackend {
    /// Create the pipelines for targets of `format`.
    pub fn new(context: &GpuContext, format: TextureFormat) -> Self {
        let device = context.device.clone();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Morph Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let quad_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Morph Quad Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });
        let polygon_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Morph Polygon Pipeline Layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let quad_pipeline = create_pipeline(
            &device,
            "Morph Quad Pipeline",
            QUAD_SHADER,
            &quad_layout,
            QuadVertex::desc(),
            format,
        );
        let polygon_pipeline = create_pipeline(
            &device,
            "Morph Polygon Pipeline",
            POLYGON_SHADER,
            &polygon_layout,
            ColorVertex::desc(),
            format,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Morph Texture Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Morph Quad Index Buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            device,
            queue: context.queue.clone(),
            quad_pipeline,
            polygon_pipeline,
            bind_group_layout,
            sampler,
            quad_index_buffer,
            textures: HashMap::new(),
            next_handle: 0,
            target: None,
        }
    }

    /// Render subsequent frames into `view`, a `width` x `height` target.
    pub fn set_target(&mut self, view: TextureView, width: u32, height: u32) {
        self.target = Some(RenderTarget {
            view,
            width,
            height,
        });
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl RenderBackend for WgpuBackend {
    fn upload_texture(&mut self, record: &TextureRecord) -> Result<TextureHandle> {
        let size = Extent3d {
            width: record.width.max(1),
            height: record.height.max(1),
            depth_or_array_layers: 1,
        };
        // Rgba8Unorm passes colors through without sRGB conversion
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(record.name.as_str()),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let mut rgba = record.to_rgba8();
        rgba.resize((size.width * size.height * 4) as usize, 0);
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Morph Texture Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        self.next_handle += 1;
        let handle = TextureHandle(self.next_handle);
        self.textures.insert(
            handle,
            GpuTexture {
                texture,
                bind_group,
            },
        );
        Ok(handle)
    }

    fn release_texture(&mut self, handle: TextureHandle) {
        if let Some(gpu) = self.textures.remove(&handle) {
            gpu.texture.destroy();
        }
    }

    fn submit(&mut self, frame: &Frame) -> Result<()> {
        let Some(target) = &self.target else {
            log::warn!("frame submitted without a render target");
            return Ok(());
        };
        if frame.is_empty() {
            return Ok(());
        }

        let mut quad_vertices: Vec<QuadVertex> = Vec::new();
        let mut polygon_vertices: Vec<ColorVertex> = Vec::new();
        let mut polygon_indices: Vec<u32> = Vec::new();
        for command in &frame.commands {
            match command {
                DrawCommand::Quad { vertices, .. } => quad_vertices.extend_from_slice(vertices),
                DrawCommand::Polygon { vertices, .. } => {
                    polygon_indices
                        .extend(fan_indices(polygon_vertices.len() as u32, vertices.len()));
                    polygon_vertices.extend_from_slice(vertices);
                }
            }
        }

        let quad_buffer = (!quad_vertices.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Morph Quad Vertex Buffer"),
                    contents: bytemuck::cast_slice(&quad_vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });
        let polygon_buffers = (!polygon_indices.is_empty()).then(|| {
            let vertices = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Morph Polygon Vertex Buffer"),
                    contents: bytemuck::cast_slice(&polygon_vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let indices = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Morph Polygon Index Buffer"),
                    contents: bytemuck::cast_slice(&polygon_indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
            (vertices, indices)
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Morph Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Morph Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            // Viewport is y-up in host pixels, wgpu's is y-down
            let (tw, th) = (target.width as f32, target.height as f32);
            let vp = frame.viewport;
            let inside = vp.x >= 0.0 && vp.y >= 0.0 && vp.right() <= tw && vp.top() <= th;
            if inside && vp.width > 0.0 && vp.height > 0.0 {
                render_pass.set_viewport(vp.x, th - vp.top(), vp.width, vp.height, 0.0, 1.0);
            } else {
                log::warn!("viewport {:?} outside {}x{} target", vp, tw, th);
            }

            let mut next_quad = 0i32;
            let mut next_index = 0u32;
            for command in &frame.commands {
                match command {
                    DrawCommand::Quad { texture, .. } => {
                        let base = next_quad * 4;
                        next_quad += 1;
                        let (Some(gpu), Some(buffer)) = (self.textures.get(texture), &quad_buffer)
                        else {
                            log::warn!("quad references unknown texture {:?}", texture);
                            continue;
                        };
                        render_pass.set_pipeline(&self.quad_pipeline);
                        render_pass.set_bind_group(0, &gpu.bind_group, &[]);
                        render_pass.set_vertex_buffer(0, buffer.slice(..));
                        render_pass.set_index_buffer(
                            self.quad_index_buffer.slice(..),
                            wgpu::IndexFormat::Uint16,
                        );
                        render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, base, 0..1);
                    }
                    DrawCommand::Polygon { vertices, .. } => {
                        let count = (vertices.len().saturating_sub(2) * 3) as u32;
                        let start = next_index;
                        next_index += count;
                        let Some((vertex_buffer, index_buffer)) = &polygon_buffers else {
                            continue;
                        };
                        if count == 0 {
                            continue;
                        }
                        render_pass.set_pipeline(&self.polygon_pipeline);
                        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                        render_pass
                            .set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(start..start + count, 0, 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}
