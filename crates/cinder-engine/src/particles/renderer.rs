use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::camera::{Camera, MatrixLayout};
use crate::render::{RenderCtx, RenderTarget, Texture};

use super::emitter::{EmitterConstants, ParticleFrame};
use super::{quad_indices, DrawRange, EmitterError, Particle, MAX_DRAWS};

/// Vertex + fragment program used to draw particles.
///
/// Must match the bind group layout of [`ParticleRenderer`]: `vs_main` and
/// `fs_main` entry points, uniform at 0, read-only record storage at 1,
/// texture at 2, sampler at 3.
#[derive(Clone)]
pub struct ParticleShader {
    module: wgpu::ShaderModule,
}

impl ParticleShader {
    /// The camera-facing billboard shader shipped with the engine.
    pub fn builtin(device: &wgpu::Device) -> Self {
        Self::from_wgsl(
            device,
            Some("cinder particle shader"),
            include_str!("shaders/particle.wgsl"),
        )
    }

    pub fn from_wgsl(device: &wgpu::Device, label: Option<&str>, source: &str) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label,
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        Self { module }
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ParticleRendererConfig {
    pub matrix_layout: MatrixLayout,
}

/// Per-draw uniform block; mirrors `Emitter` in `particle.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct EmitterUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    start_color: [f32; 4],
    end_color: [f32; 4],
    acceleration: [f32; 3],
    start_size: f32,
    end_size: f32,
    lifetime: f32,
    current_time: f32,
    start_index: u32,
    debug_overlay: u32,
    _pad: [u32; 3],
}

const _: () = assert!(std::mem::size_of::<EmitterUniform>() == 208);

impl EmitterUniform {
    fn new(
        constants: &EmitterConstants,
        camera: &Camera,
        layout: MatrixLayout,
        range: DrawRange,
        debug_overlay: bool,
    ) -> Self {
        Self {
            view: layout.arrange(camera.view_matrix()),
            projection: layout.arrange(camera.projection_matrix()),
            start_color: constants.start_color,
            end_color: constants.end_color,
            acceleration: constants.acceleration.to_array(),
            start_size: constants.start_size,
            end_size: constants.end_size,
            lifetime: constants.lifetime,
            current_time: constants.current_time,
            start_index: range.start_index,
            debug_overlay: u32::from(debug_overlay),
            _pad: [0; 3],
        }
    }
}

const UNIFORM_SIZE: u64 = std::mem::size_of::<EmitterUniform>() as u64;
const RECORD_SIZE: u64 = std::mem::size_of::<Particle>() as u64;
const INDEX_SIZE: u64 = std::mem::size_of::<u32>() as u64;

/// Rejects pools whose GPU buffers the device cannot hold.
///
/// Checked up front since wgpu reports oversized buffers as validation errors
/// on the device rather than as a return value.
pub fn check_buffer_limits(capacity: usize, limits: &wgpu::Limits) -> Result<(), EmitterError> {
    let capacity = capacity as u64;
    let storage = capacity.saturating_mul(RECORD_SIZE);
    let indices = capacity.saturating_mul(6 * INDEX_SIZE);

    let binding_limit = u64::from(limits.max_storage_buffer_binding_size);
    if storage > binding_limit {
        return Err(EmitterError::BufferTooLarge {
            what: "particle storage binding",
            required: storage,
            limit: binding_limit,
        });
    }
    for (what, required) in [("particle storage buffer", storage), ("particle index buffer", indices)]
    {
        if required > limits.max_buffer_size {
            return Err(EmitterError::BufferTooLarge {
                what,
                required,
                limit: limits.max_buffer_size,
            });
        }
    }
    Ok(())
}

/// Byte distance between per-draw uniform slots.
fn uniform_stride(min_alignment: u32) -> u64 {
    let align = u64::from(min_alignment.max(1));
    UNIFORM_SIZE.div_ceil(align) * align
}

/// GPU side of an emitter: record storage, quad indices, per-draw uniforms.
///
/// Buffers are sized once from the pool capacity. The pipeline is rebuilt
/// whenever the color or depth format of the target changes.
pub struct ParticleRenderer {
    config: ParticleRendererConfig,
    capacity: usize,
    debug_overlay: bool,

    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipeline_formats: Option<(wgpu::TextureFormat, wgpu::TextureFormat)>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group: wgpu::BindGroup,
    storage: wgpu::Buffer,
    indices: wgpu::Buffer,
    uniforms: wgpu::Buffer,
    uniform_stride: u64,
}

impl ParticleRenderer {
    pub fn new(
        ctx: &RenderCtx<'_>,
        capacity: usize,
        shader: &ParticleShader,
        texture: &Texture,
        config: ParticleRendererConfig,
    ) -> Result<Self, EmitterError> {
        let limits = ctx.device.limits();
        check_buffer_limits(capacity, &limits)?;

        let storage = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cinder particle storage"),
            size: capacity as u64 * RECORD_SIZE,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let indices = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cinder particle ibo"),
            contents: bytemuck::cast_slice(&quad_indices(capacity)),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniform_stride = uniform_stride(limits.min_uniform_buffer_offset_alignment);
        let uniforms = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cinder particle ubo"),
            size: uniform_stride * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("cinder particle bgl"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: true,
                                min_binding_size: NonZeroU64::new(UNIFORM_SIZE),
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::VERTEX,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Storage { read_only: true },
                                has_dynamic_offset: false,
                                min_binding_size: NonZeroU64::new(RECORD_SIZE),
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 3,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cinder particle bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &uniforms,
                        offset: 0,
                        size: NonZeroU64::new(UNIFORM_SIZE),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: storage.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(texture.sampler()),
                },
            ],
        });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("cinder particle pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        log::debug!(
            "particle buffers: {} B storage, {} B indices, {} B uniform stride",
            storage.size(),
            indices.size(),
            uniform_stride
        );

        Ok(Self {
            config,
            capacity,
            debug_overlay: false,
            shader: shader.module().clone(),
            pipeline_layout,
            pipeline_formats: None,
            pipeline: None,
            bind_group,
            storage,
            indices,
            uniforms,
            uniform_stride,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_debug_overlay(&mut self, enabled: bool) {
        self.debug_overlay = enabled;
    }

    pub fn debug_overlay(&self) -> bool {
        self.debug_overlay
    }

    /// Uploads `frame` and records one or two indexed draws into `target`.
    ///
    /// The whole record array is copied even when nothing is alive; dead
    /// slots are never referenced by a draw.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        camera: &Camera,
        frame: &ParticleFrame<'_>,
    ) {
        debug_assert_eq!(frame.records.len(), self.capacity);
        self.ensure_pipeline(ctx);

        ctx.queue
            .write_buffer(&self.storage, 0, bytemuck::cast_slice(frame.records));

        let draws = frame.draws.as_slice();
        if draws.is_empty() {
            return;
        }

        for (slot, range) in draws.iter().enumerate() {
            let uniform = EmitterUniform::new(
                &frame.constants,
                camera,
                self.config.matrix_layout,
                *range,
                self.debug_overlay,
            );
            ctx.queue.write_buffer(
                &self.uniforms,
                slot as u64 * self.uniform_stride,
                bytemuck::bytes_of(&uniform),
            );
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("cinder particle pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);

        for (slot, range) in draws.iter().enumerate() {
            // Dynamic offsets are u32; the stride is at most a few hundred bytes.
            let offset = (slot as u64 * self.uniform_stride) as u32;
            rpass.set_bind_group(0, &self.bind_group, &[offset]);
            rpass.draw_indexed(0..range.index_count(), 0, 0..1);
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        let formats = (ctx.surface_format, ctx.depth_format);
        if self.pipeline_formats == Some(formats) && self.pipeline.is_some() {
            return;
        }

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cinder particle pipeline"),
            layout: Some(&self.pipeline_layout),

            // No vertex buffers: everything comes from vertex_index and storage.
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },

            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(additive_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
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

            // Tested against scene depth, never written.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        log::debug!(
            "particle pipeline built for {:?} / {:?}",
            ctx.surface_format,
            ctx.depth_format
        );
        self.pipeline_formats = Some(formats);
        self.pipeline = Some(pipeline);
    }
}

/// Color adds `src * src_alpha` onto the target; alpha accumulates.
pub(crate) fn additive_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use glam::{Mat4, Vec3};

    fn constants() -> EmitterConstants {
        EmitterConstants {
            acceleration: Vec3::new(0.0, -1.0, 0.0),
            start_color: [1.0, 0.5, 0.25, 1.0],
            end_color: [0.0, 0.0, 0.0, 0.0],
            start_size: 0.75,
            end_size: 0.5,
            lifetime: 3.0,
            current_time: 12.5,
        }
    }

    // ── uniform layout ───────────────────────────────────────────────────

    #[test]
    fn uniform_fields_sit_at_shader_offsets() {
        let camera = Camera::new(CameraConfig::default(), 800, 600);
        let range = DrawRange { start_index: 7, quad_count: 3 };
        let u = EmitterUniform::new(&constants(), &camera, MatrixLayout::ColumnMajor, range, true);

        let words: &[u32] = bytemuck::cast_slice(std::slice::from_ref(&u));
        let float = |i: usize| f32::from_bits(words[i]);
        // mat4 view (0..16), mat4 projection (16..32)
        assert_eq!([float(32), float(33), float(34), float(35)], [1.0, 0.5, 0.25, 1.0]);
        assert_eq!([float(40), float(41), float(42)], [0.0, -1.0, 0.0]);
        assert_eq!(float(43), 0.75);
        assert_eq!(float(44), 0.5);
        assert_eq!(float(45), 3.0);
        assert_eq!(float(46), 12.5);
        assert_eq!(words[47], 7);
        assert_eq!(words[48], 1);
    }

    #[test]
    fn row_major_layout_transposes_matrices() {
        let camera = Camera::new(CameraConfig::default(), 800, 600);
        let range = DrawRange::default();
        let col = EmitterUniform::new(&constants(), &camera, MatrixLayout::ColumnMajor, range, false);
        let row = EmitterUniform::new(&constants(), &camera, MatrixLayout::RowMajor, range, false);

        let projection = Mat4::from_cols_array_2d(&col.projection);
        assert_eq!(Mat4::from_cols_array_2d(&row.projection), projection.transpose());
        assert_eq!(row.debug_overlay, 0);
    }

    // ── limits ───────────────────────────────────────────────────────────

    #[test]
    fn default_limits_accept_demo_sized_pools() {
        let limits = wgpu::Limits::default();
        assert!(check_buffer_limits(200, &limits).is_ok());
        assert!(check_buffer_limits(100_000, &limits).is_ok());
    }

    #[test]
    fn storage_binding_limit_is_reported() {
        let limits = wgpu::Limits {
            max_storage_buffer_binding_size: 4800,
            ..wgpu::Limits::default()
        };
        assert!(check_buffer_limits(100, &limits).is_ok());
        match check_buffer_limits(101, &limits) {
            Err(EmitterError::BufferTooLarge { required, limit, .. }) => {
                assert_eq!(required, 101 * 48);
                assert_eq!(limit, 4800);
            }
            other => panic!("expected BufferTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn buffer_size_limit_is_reported() {
        // 100 quads: 4800 B of records, 2400 B of indices.
        let limits = wgpu::Limits {
            max_buffer_size: 4800,
            ..wgpu::Limits::default()
        };
        assert!(check_buffer_limits(100, &limits).is_ok());

        let limits = wgpu::Limits {
            max_buffer_size: 2000,
            max_storage_buffer_binding_size: 1 << 20,
            ..wgpu::Limits::default()
        };
        assert!(matches!(
            check_buffer_limits(100, &limits),
            Err(EmitterError::BufferTooLarge { what: "particle storage buffer", required: 4800, limit: 2000 })
        ));
    }

    #[test]
    fn uniform_slots_respect_offset_alignment() {
        assert_eq!(uniform_stride(256), 256);
        assert_eq!(uniform_stride(64), 256);
        assert_eq!(uniform_stride(16), 208);
        assert_eq!(uniform_stride(512), 512);
    }

    #[test]
    fn blend_is_additive() {
        let blend = additive_blend();
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::One);
    }
}
