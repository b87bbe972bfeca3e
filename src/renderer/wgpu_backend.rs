use anyhow::{bail, Context, Result};
use glam::Mat4;
use std::num::NonZeroU64;
use wgpu::util::DeviceExt;

use super::{DepthPass, DrawItem, LitPass, MeshHandle, ShadowBackend, DEPTH_FORMAT};
use crate::light::MAX_LIGHTS;
use crate::mesh::{Mesh, MeshVertex};
use crate::shadow::{LitFrameUniform, MAX_SHADOW_CASCADES};

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const MATRIX_SIZE: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;

/// Depth texture array owned by one light camera, plus a render view per slice.
pub struct WgpuDepthTarget {
    texture: wgpu::Texture,
    array_view: wgpu::TextureView,
    layer_views: Vec<wgpu::TextureView>,
    layers: u32,
    resolution: u32,
}

impl WgpuDepthTarget {
    fn new(device: &wgpu::Device, label: &str, layers: u32, resolution: u32) -> Self {
        let layers = layers.max(1);
        let resolution = resolution.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d { width: resolution, height: resolution, depth_or_array_layers: layers },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shadow Map Array View"),
            format: Some(DEPTH_FORMAT),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            base_array_layer: 0,
            array_layer_count: Some(layers),
            ..Default::default()
        });
        let layer_views = (0..layers)
            .map(|layer| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("Shadow Map Cascade Layer"),
                    format: Some(DEPTH_FORMAT),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();
        Self { texture, array_view, layer_views, layers, resolution }
    }

    pub fn layers(&self) -> u32 {
        self.layers
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Per-frame uniform buffer addressed with dynamic offsets. Grows (and rebuilds its bind group) when a
/// frame needs more entries than it holds.
struct UniformArena {
    label: &'static str,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: u64,
    cursor: u64,
}

impl UniformArena {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &'static str,
        stride: u64,
        capacity: u64,
    ) -> Self {
        let (buffer, bind_group) = Self::allocate(device, layout, label, stride, capacity);
        Self { label, buffer, bind_group, stride, capacity, cursor: 0 }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &'static str,
        stride: u64,
        capacity: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride * capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(MATRIX_SIZE),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Makes room for `count` more entries. Growing swaps in a fresh buffer and bind group, so a batch
    /// reserved together always shares one bind group.
    fn reserve(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, count: u64) {
        if self.cursor + count <= self.capacity {
            return;
        }
        let capacity = (self.capacity * 2).max(count).next_power_of_two();
        log::debug!("[renderer] growing {} to {} entries", self.label, capacity);
        let (buffer, bind_group) = Self::allocate(device, layout, self.label, self.stride, capacity);
        self.buffer = buffer;
        self.bind_group = bind_group;
        self.capacity = capacity;
        self.cursor = 0;
    }

    /// Writes one matrix and returns its dynamic offset.
    fn push(&mut self, queue: &wgpu::Queue, matrix: Mat4) -> Result<u32> {
        if self.cursor >= self.capacity {
            bail!("{} overflow: reserve before pushing", self.label);
        }
        let offset = self.cursor * self.stride;
        queue.write_buffer(&self.buffer, offset, bytemuck::bytes_of(&matrix.to_cols_array_2d()));
        self.cursor += 1;
        u32::try_from(offset).context("Uniform arena offset exceeds u32")
    }
}

struct LitTargets {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

/// [`ShadowBackend`] on top of wgpu. Renders offscreen; the lit image is available through
/// [`WgpuShadowBackend::color_texture`].
pub struct WgpuShadowBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    size: (u32, u32),
    matrix_bgl: wgpu::BindGroupLayout,
    lit_frame_bgl: wgpu::BindGroupLayout,
    depth_pipeline: wgpu::RenderPipeline,
    lit_pipeline: wgpu::RenderPipeline,
    pass_arena: UniformArena,
    draw_arena: UniformArena,
    lit_uniform: wgpu::Buffer,
    sampler: wgpu::Sampler,
    placeholder: WgpuDepthTarget,
    targets: LitTargets,
    meshes: Vec<GpuMesh>,
    encoder: Option<wgpu::CommandEncoder>,
    frames_submitted: u64,
}

impl WgpuShadowBackend {
    /// Creates a device without a surface. Fails when no adapter is available.
    pub async fn new_headless(width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request headless adapter")?;
        let info = adapter.get_info();
        if !adapter.get_downlevel_capabilities().is_webgpu_compliant() {
            bail!("Adapter {} ({:?}) lacks depth-array comparison sampling support", info.name, info.backend);
        }
        log::info!("[renderer] headless adapter: {} ({:?})", info.name, info.backend);
        let device_desc = wgpu::DeviceDescriptor {
            label: Some("Shadow Headless Device"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        };
        let (device, queue) =
            adapter.request_device(&device_desc).await.context("Failed to request headless device")?;
        Self::from_device(device, queue, width, height)
    }

    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue, width: u32, height: u32) -> Result<Self> {
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment).max(MATRIX_SIZE);
        let stride = MATRIX_SIZE.div_ceil(alignment) * alignment;
        let lit_size = std::mem::size_of::<LitFrameUniform>() as u64;
        if lit_size > u64::from(device.limits().max_uniform_buffer_binding_size) {
            bail!("Device uniform binding limit is below the {lit_size}-byte lit frame block");
        }

        let matrix_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Matrix BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(MATRIX_SIZE),
                },
                count: None,
            }],
        });

        let mut lit_entries = Vec::with_capacity(MAX_LIGHTS + 2);
        lit_entries.push(wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(lit_size),
            },
            count: None,
        });
        for slot in 0..MAX_LIGHTS as u32 {
            lit_entries.push(wgpu::BindGroupLayoutEntry {
                binding: 1 + slot,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Depth,
                    view_dimension: wgpu::TextureViewDimension::D2Array,
                    multisampled: false,
                },
                count: None,
            });
        }
        lit_entries.push(wgpu::BindGroupLayoutEntry {
            binding: 1 + MAX_LIGHTS as u32,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
            count: None,
        });
        let lit_frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lit Frame BGL"),
            entries: &lit_entries,
        });

        let depth_pipeline = create_depth_pipeline(&device, &matrix_bgl);
        let lit_pipeline = create_lit_pipeline(&device, &lit_frame_bgl, &matrix_bgl);

        let pass_capacity = (MAX_LIGHTS * MAX_SHADOW_CASCADES) as u64;
        let pass_arena = UniformArena::new(&device, &matrix_bgl, "Shadow Pass Uniforms", stride, pass_capacity);
        let draw_arena = UniformArena::new(&device, &matrix_bgl, "Shadow Draw Uniforms", stride, 256);
        let lit_uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lit Frame Uniform"),
            size: lit_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            lod_min_clamp: 0.0,
            lod_max_clamp: 0.0,
            compare: Some(wgpu::CompareFunction::LessEqual),
            anisotropy_clamp: 1,
            border_color: None,
        });
        let placeholder = WgpuDepthTarget::new(&device, "Shadow Map Placeholder", 1, 1);
        let size = (width.max(1), height.max(1));
        let targets = create_lit_targets(&device, size);

        Ok(Self {
            device,
            queue,
            size,
            matrix_bgl,
            lit_frame_bgl,
            depth_pipeline,
            lit_pipeline,
            pass_arena,
            draw_arena,
            lit_uniform,
            sampler,
            placeholder,
            targets,
            meshes: Vec::new(),
            encoder: None,
            frames_submitted: 0,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let size = (width.max(1), height.max(1));
        if size != self.size {
            self.size = size;
            self.targets = create_lit_targets(&self.device, size);
        }
    }

    pub fn color_texture(&self) -> &wgpu::Texture {
        &self.targets.color
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    pub fn upload_mesh(&mut self, mesh: &Mesh) -> MeshHandle {
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.meshes.push(GpuMesh { vertex_buffer, index_buffer, index_count: mesh.index_count() });
        MeshHandle(self.meshes.len() as u32 - 1)
    }

    /// Writes one model matrix per draw and pairs its offset with the mesh index.
    fn push_draws(&mut self, draws: &[&DrawItem]) -> Result<Vec<(u32, usize)>> {
        self.draw_arena.reserve(&self.device, &self.matrix_bgl, draws.len() as u64);
        let mut out = Vec::with_capacity(draws.len());
        for draw in draws {
            let mesh = draw.mesh.0 as usize;
            if mesh >= self.meshes.len() {
                bail!("Draw references unknown mesh handle {}", draw.mesh.0);
            }
            let offset = self.draw_arena.push(&self.queue, draw.model)?;
            out.push((offset, mesh));
        }
        Ok(out)
    }
}

impl ShadowBackend for WgpuShadowBackend {
    type DepthTarget = WgpuDepthTarget;

    fn create_depth_target(&mut self, slot: usize, layers: u32, resolution: u32) -> Result<Self::DepthTarget> {
        let limits = self.device.limits();
        if resolution > limits.max_texture_dimension_2d {
            bail!(
                "Shadow map resolution {resolution} exceeds device limit {}",
                limits.max_texture_dimension_2d
            );
        }
        if layers > limits.max_texture_array_layers {
            bail!("{layers} shadow slices exceed device limit {}", limits.max_texture_array_layers);
        }
        let label = format!("Shadow Map Slot {slot}");
        Ok(WgpuDepthTarget::new(&self.device, &label, layers, resolution))
    }

    fn begin_frame(&mut self) -> Result<()> {
        if self.encoder.is_some() {
            bail!("begin_frame called twice without end_frame");
        }
        self.pass_arena.reset();
        self.draw_arena.reset();
        self.encoder = Some(
            self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Shadow Frame") }),
        );
        Ok(())
    }

    fn depth_pass(&mut self, pass: DepthPass<'_, Self::DepthTarget>) -> Result<()> {
        let layer_view = pass
            .target
            .layer_views
            .get(pass.layer as usize)
            .with_context(|| format!("Shadow map for slot {} has no layer {}", pass.slot, pass.layer))?;
        self.pass_arena.reserve(&self.device, &self.matrix_bgl, 1);
        let pass_offset = self.pass_arena.push(&self.queue, pass.view_proj)?;
        let draws = self.push_draws(pass.casters)?;
        let encoder = self.encoder.as_mut().context("Depth pass recorded outside a frame")?;
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Depth Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: layer_view,
                depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        let res_f = pass.target.resolution as f32;
        rpass.set_pipeline(&self.depth_pipeline);
        rpass.set_viewport(0.0, 0.0, res_f, res_f, 0.0, 1.0);
        rpass.set_bind_group(0, &self.pass_arena.bind_group, &[pass_offset]);
        for (offset, mesh) in draws {
            let mesh = &self.meshes[mesh];
            rpass.set_bind_group(1, &self.draw_arena.bind_group, &[offset]);
            rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
        Ok(())
    }

    fn lit_pass(&mut self, pass: LitPass<'_, Self::DepthTarget>) -> Result<()> {
        self.queue.write_buffer(&self.lit_uniform, 0, bytemuck::bytes_of(pass.uniform));
        let draws = self.push_draws(pass.draws)?;

        let mut entries = Vec::with_capacity(MAX_LIGHTS + 2);
        entries.push(wgpu::BindGroupEntry { binding: 0, resource: self.lit_uniform.as_entire_binding() });
        for (slot, target) in pass.depth_targets.iter().enumerate() {
            let view = &target.unwrap_or(&self.placeholder).array_view;
            entries.push(wgpu::BindGroupEntry {
                binding: 1 + slot as u32,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
        entries.push(wgpu::BindGroupEntry {
            binding: 1 + MAX_LIGHTS as u32,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        });
        let frame_bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lit Frame BG"),
            layout: &self.lit_frame_bgl,
            entries: &entries,
        });

        let encoder = self.encoder.as_mut().context("Lit pass recorded outside a frame")?;
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Lit Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.targets.color_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.05, g: 0.06, b: 0.1, a: 1.0 }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.targets.depth_view,
                depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Discard }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        rpass.set_pipeline(&self.lit_pipeline);
        rpass.set_bind_group(0, &frame_bg, &[]);
        for (offset, mesh) in draws {
            let mesh = &self.meshes[mesh];
            rpass.set_bind_group(1, &self.draw_arena.bind_group, &[offset]);
            rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        let encoder = self.encoder.take().context("end_frame called without begin_frame")?;
        self.queue.submit(Some(encoder.finish()));
        self.frames_submitted += 1;
        Ok(())
    }
}

fn create_depth_pipeline(device: &wgpu::Device, matrix_bgl: &wgpu::BindGroupLayout) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Shadow Depth Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("../../assets/shaders/shadow_depth.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Shadow Depth Pipeline Layout"),
        bind_group_layouts: &[matrix_bgl, matrix_bgl],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Shadow Depth Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[MeshVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: None,
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_lit_pipeline(
    device: &wgpu::Device,
    lit_frame_bgl: &wgpu::BindGroupLayout,
    matrix_bgl: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Lit Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("../../assets/shaders/lit.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Lit Pipeline Layout"),
        bind_group_layouts: &[lit_frame_bgl, matrix_bgl],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Lit Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[MeshVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: COLOR_FORMAT,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_lit_targets(device: &wgpu::Device, size: (u32, u32)) -> LitTargets {
    let extent = wgpu::Extent3d { width: size.0, height: size.1, depth_or_array_layers: 1 };
    let color = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Lit Color Target"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Lit Depth Target"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
    let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());
    LitTargets { color, color_view, depth_view }
}
