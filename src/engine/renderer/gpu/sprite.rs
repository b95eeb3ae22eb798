// Sprite batching and the textured quad pipeline

use glam::{Vec2, Vec4};
use wgpu::util::DeviceExt;

use super::texture::TextureStore;
use super::{Camera, CameraUniform, Vertex};
use crate::engine::renderer::{Rect, TextureHandle};

/// Consecutive quads drawn with the same texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRun {
    pub texture: TextureHandle,
    pub first_quad: u32,
    pub quads: u32,
}

/// Quads queued for the current frame, grouped into runs per texture in
/// submission order
#[derive(Debug, Default)]
pub struct QuadBatch {
    vertices: Vec<Vertex>,
    runs: Vec<DrawRun>,
}

impl QuadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `dst` (pixels) textured with the normalized `uv` region
    pub fn push(&mut self, texture: TextureHandle, uv: Rect, dst: Rect, color: Vec4) {
        let quad = self.quad_count();
        match self.runs.last_mut() {
            Some(run) if run.texture == texture => run.quads += 1,
            _ => self.runs.push(DrawRun {
                texture,
                first_quad: quad,
                quads: 1,
            }),
        }

        let (x0, y0, x1, y1) = (dst.x, dst.y, dst.x + dst.w, dst.y + dst.h);
        let (u0, v0, u1, v1) = (uv.x, uv.y, uv.x + uv.w, uv.y + uv.h);
        self.vertices.extend_from_slice(&[
            Vertex::new(Vec2::new(x0, y0), Vec2::new(u0, v0), color),
            Vertex::new(Vec2::new(x1, y0), Vec2::new(u1, v0), color),
            Vertex::new(Vec2::new(x1, y1), Vec2::new(u1, v1), color),
            Vertex::new(Vec2::new(x0, y1), Vec2::new(u0, v1), color),
        ]);
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.runs.clear();
    }

    pub fn quad_count(&self) -> u32 {
        (self.vertices.len() / 4) as u32
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn runs(&self) -> &[DrawRun] {
        &self.runs
    }
}

/// Pixel rectangle of a `width` x `height` texture as normalized UVs
pub fn uv_rect(src: Rect, width: u32, height: u32) -> Rect {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    Rect::new(src.x / w, src.y / h, src.w / w, src.h / h)
}

fn quad_indices(quads: u32) -> Vec<u32> {
    (0..quads)
        .flat_map(|q| {
            let i = q * 4;
            [i, i + 1, i + 2, i, i + 2, i + 3]
        })
        .collect()
}

/// Render pipeline plus the GPU buffers a [`QuadBatch`] is uploaded into
pub struct SpritePipeline {
    render_pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    /// Quads the buffers can currently hold
    capacity: u32,
}

impl SpritePipeline {
    const INITIAL_CAPACITY: u32 = 256;

    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // The y-down projection flips winding
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform {
                view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let (vertex_buffer, index_buffer) = Self::create_buffers(device, Self::INITIAL_CAPACITY);

        Self {
            render_pipeline,
            texture_layout,
            camera_buffer,
            camera_bind_group,
            vertex_buffer,
            index_buffer,
            capacity: Self::INITIAL_CAPACITY,
        }
    }

    fn create_buffers(device: &wgpu::Device, quads: u32) -> (wgpu::Buffer, wgpu::Buffer) {
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Vertex Buffer"),
            size: (quads as usize * 4 * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Index Buffer"),
            contents: bytemuck::cast_slice(&quad_indices(quads)),
            usage: wgpu::BufferUsages::INDEX,
        });
        (vertex_buffer, index_buffer)
    }

    /// Layout texture bind groups must be created with
    pub fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_layout
    }

    /// Upload the camera and the batch's vertices, growing buffers as needed
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera: &Camera,
        batch: &QuadBatch,
    ) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniform::new(camera)]),
        );

        let quads = batch.quad_count();
        if quads > self.capacity {
            let capacity = quads.next_power_of_two();
            let (vertex_buffer, index_buffer) = Self::create_buffers(device, capacity);
            self.vertex_buffer = vertex_buffer;
            self.index_buffer = index_buffer;
            self.capacity = capacity;
        }
        if quads > 0 {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(batch.vertices()));
        }
    }

    /// Draw each run of the batch with its texture bound
    pub fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        batch: &QuadBatch,
        textures: &'a TextureStore,
    ) {
        if batch.runs().is_empty() {
            return;
        }

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        for run in batch.runs() {
            let Some(texture) = textures.get(run.texture) else {
                continue;
            };
            render_pass.set_bind_group(1, texture.bind_group(), &[]);
            let first = run.first_quad * 6;
            render_pass.draw_indexed(first..first + run.quads * 6, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_group_consecutive_textures() {
        let a = TextureHandle(0);
        let b = TextureHandle(1);
        let uv = Rect::new(0.0, 0.0, 1.0, 1.0);
        let dst = Rect::new(0.0, 0.0, 8.0, 8.0);

        let mut batch = QuadBatch::new();
        batch.push(a, uv, dst, Vec4::ONE);
        batch.push(a, uv, dst, Vec4::ONE);
        batch.push(b, uv, dst, Vec4::ONE);
        batch.push(a, uv, dst, Vec4::ONE);

        assert_eq!(batch.quad_count(), 4);
        assert_eq!(
            batch.runs(),
            &[
                DrawRun { texture: a, first_quad: 0, quads: 2 },
                DrawRun { texture: b, first_quad: 2, quads: 1 },
                DrawRun { texture: a, first_quad: 3, quads: 1 },
            ]
        );

        batch.clear();
        assert_eq!(batch.quad_count(), 0);
        assert!(batch.runs().is_empty());
    }

    #[test]
    fn test_quad_corners() {
        let mut batch = QuadBatch::new();
        batch.push(
            TextureHandle(0),
            Rect::new(0.25, 0.0, 0.25, 0.5),
            Rect::new(10.0, 20.0, 32.0, 16.0),
            Vec4::ONE,
        );
        let v = batch.vertices();
        assert_eq!(v[0].position, [10.0, 20.0]);
        assert_eq!(v[2].position, [42.0, 36.0]);
        assert_eq!(v[0].tex_coords, [0.25, 0.0]);
        assert_eq!(v[2].tex_coords, [0.5, 0.5]);
    }

    #[test]
    fn test_uv_rect_and_indices() {
        let uv = uv_rect(Rect::new(32.0, 0.0, 32.0, 32.0), 128, 64);
        assert_eq!(uv, Rect::new(0.25, 0.0, 0.25, 0.5));
        assert_eq!(quad_indices(2), vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }
}
