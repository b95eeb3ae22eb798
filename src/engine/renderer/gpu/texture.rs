// GPU textures and their bind groups

use anyhow::{Context, Result};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::engine::renderer::{TextureHandle, TextureInfo};

/// A texture uploaded to the GPU, ready to bind
pub struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    pub width: u32,
    pub height: u32,
}

impl GpuTexture {
    /// Upload tightly packed RGBA8 pixels
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        rgba: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        // Nearest filtering keeps pixel art and sheet frames crisp
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            _texture: texture,
            bind_group,
            width,
            height,
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Every texture the renderer owns, indexed by [`TextureHandle`]
#[derive(Default)]
pub struct TextureStore {
    textures: Vec<GpuTexture>,
    by_path: HashMap<PathBuf, TextureInfo>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an image file and upload it, once per path
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        path: &Path,
    ) -> Result<TextureInfo> {
        if let Some(info) = self.by_path.get(path) {
            return Ok(*info);
        }

        let img = image::open(path)
            .with_context(|| format!("Failed to load texture {}", path.display()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let label = path.to_string_lossy();
        let texture = GpuTexture::from_rgba(device, queue, layout, &rgba, width, height, &label);

        let info = self.insert(texture);
        self.by_path.insert(path.to_path_buf(), info);
        debug!("Uploaded texture {} ({}x{})", label, width, height);
        Ok(info)
    }

    /// Upload a 1x1 texture of one color
    pub fn color(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        rgba: [u8; 4],
        label: &str,
    ) -> TextureInfo {
        let texture = GpuTexture::from_rgba(device, queue, layout, &rgba, 1, 1, label);
        self.insert(texture)
    }

    fn insert(&mut self, texture: GpuTexture) -> TextureInfo {
        let info = TextureInfo {
            handle: TextureHandle(self.textures.len()),
            width: texture.width,
            height: texture.height,
        };
        self.textures.push(texture);
        info
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        self.textures.get(handle.0)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
