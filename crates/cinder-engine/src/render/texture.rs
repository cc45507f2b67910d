use std::path::Path;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;

/// A sampled 2D texture with its view and sampler.
pub struct Texture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl Texture {
    /// Creates an sRGB texture from tightly packed RGBA8 rows.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        label: Option<&str>,
    ) -> Result<Self> {
        anyhow::ensure!(width > 0 && height > 0, "texture has zero size");
        let expected = width as usize * height as usize * 4;
        anyhow::ensure!(
            data.len() == expected,
            "RGBA8 data is {} bytes, expected {expected} for {width}x{height}",
            data.len()
        );

        // create_texture_with_data handles row alignment.
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label,
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("cinder texture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self { texture, view, sampler })
    }

    /// Decodes an encoded image (PNG, JPEG) and uploads it.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: Option<&str>,
    ) -> Result<Self> {
        let img = image::load_from_memory(bytes).context("failed to decode image")?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(device, queue, rgba.as_raw(), width, height, label)
    }

    /// Reads and decodes an image file.
    pub fn from_path(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read texture {}", path.display()))?;
        let label = path.file_name().and_then(|n| n.to_str());
        Self::from_bytes(device, queue, &bytes, label)
            .with_context(|| format!("failed to load texture {}", path.display()))
    }

    /// Generates a white disc whose alpha falls off toward the rim.
    ///
    /// Stand-in particle sprite when no image is supplied.
    pub fn soft_disc(device: &wgpu::Device, queue: &wgpu::Queue, size: u32) -> Result<Self> {
        let pixels = soft_disc_pixels(size);
        Self::from_rgba8(device, queue, &pixels, size, size, Some("cinder soft disc"))
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

/// RGBA8 pixels of a `size`x`size` disc: white, alpha `(1 - r)^2` with `r`
/// the distance from the center normalized to the inscribed circle.
pub(crate) fn soft_disc_pixels(size: u32) -> Vec<u8> {
    let size = size.max(1);
    let half = size as f32 * 0.5;
    let mut data = Vec::with_capacity((size * size * 4) as usize);

    for y in 0..size {
        for x in 0..size {
            let dx = (x as f32 + 0.5 - half) / half;
            let dy = (y as f32 + 0.5 - half) / half;
            let r = (dx * dx + dy * dy).sqrt();
            let falloff = (1.0 - r).clamp(0.0, 1.0);
            let alpha = (falloff * falloff * 255.0).round() as u8;
            data.extend_from_slice(&[255, 255, 255, alpha]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_at(pixels: &[u8], size: u32, x: u32, y: u32) -> u8 {
        pixels[((y * size + x) * 4 + 3) as usize]
    }

    #[test]
    fn soft_disc_has_rgba_layout() {
        let pixels = soft_disc_pixels(16);
        assert_eq!(pixels.len(), 16 * 16 * 4);
        assert!(pixels.chunks_exact(4).all(|p| p[0] == 255 && p[1] == 255 && p[2] == 255));
    }

    #[test]
    fn soft_disc_is_opaque_center_and_clear_corners() {
        let size = 32;
        let pixels = soft_disc_pixels(size);
        assert!(alpha_at(&pixels, size, 16, 16) > 200);
        assert_eq!(alpha_at(&pixels, size, 0, 0), 0);
        assert_eq!(alpha_at(&pixels, size, size - 1, size - 1), 0);
    }

    #[test]
    fn soft_disc_falls_off_monotonically_along_a_row() {
        let size = 32;
        let pixels = soft_disc_pixels(size);
        let row: Vec<u8> = (16..size).map(|x| alpha_at(&pixels, size, x, 16)).collect();
        assert!(row.windows(2).all(|w| w[0] >= w[1]));
    }
}
