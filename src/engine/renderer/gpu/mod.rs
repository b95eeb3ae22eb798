// Window renderer using wgpu

mod camera;
mod sprite;
mod texture;
mod vertex;

pub use camera::{Camera, CameraUniform, Viewport};
pub use sprite::{DrawRun, QuadBatch, SpritePipeline};
pub use texture::{GpuTexture, TextureStore};
pub use vertex::Vertex;

use anyhow::{anyhow, bail, Result};
use glam::{Vec2, Vec4};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use winit::window::Window;

use super::{Color, Rect, RenderBackend, TextureHandle, TextureInfo};

/// Render backend drawing batched textured quads into a window surface
pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    pipeline: SpritePipeline,
    textures: TextureStore,
    batch: QuadBatch,
    camera: Camera,
    clear_color: Color,
}

impl WgpuRenderer {
    /// Create a new renderer for the given window
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("Failed to find suitable GPU adapter"))?;

        info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let pipeline = SpritePipeline::new(&device, surface_format);
        let camera = Camera::new(config.width as f32, config.height as f32);

        info!(
            "Renderer initialized with {}x{} resolution",
            config.width, config.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            pipeline,
            textures: TextureStore::new(),
            batch: QuadBatch::new(),
            camera,
            clear_color: Color::default(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.camera
                .resize(new_size.width as f32, new_size.height as f32);
            info!("Renderer resized to {}x{}", new_size.width, new_size.height);
        }
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl RenderBackend for WgpuRenderer {
    fn create_texture(&mut self, path: &Path) -> Result<TextureInfo> {
        self.textures.load(
            &self.device,
            &self.queue,
            self.pipeline.texture_layout(),
            path,
        )
    }

    fn create_color_texture(&mut self, name: &str, rgba: [u8; 4]) -> Result<TextureInfo> {
        Ok(self.textures.color(
            &self.device,
            &self.queue,
            self.pipeline.texture_layout(),
            rgba,
            name,
        ))
    }

    fn clear(&mut self, color: Color) {
        self.clear_color = color;
        self.batch.clear();
    }

    fn draw_texture(&mut self, texture: TextureHandle, src: Rect, dst: Rect) -> Result<()> {
        let Some(gpu) = self.textures.get(texture) else {
            bail!("Unknown texture handle {}", texture.index());
        };
        let min = Vec2::new(dst.x, dst.y);
        let max = min + Vec2::new(dst.w, dst.h);
        if !self.camera.viewport_bounds().intersects_rect(min, max) {
            return Ok(());
        }
        let uv = sprite::uv_rect(src, gpu.width, gpu.height);
        self.batch.push(texture, uv, dst, Vec4::ONE);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.batch.clear();
                bail!("Surface lost");
            }
            Err(e) => {
                self.batch.clear();
                return Err(e.into());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.pipeline
            .prepare(&self.device, &self.queue, &self.camera, &self.batch);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let Color { r, g, b, a } = self.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.pipeline
                .draw(&mut render_pass, &self.batch, &self.textures);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.batch.clear();

        Ok(())
    }
}
