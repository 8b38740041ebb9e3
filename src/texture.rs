//! Panorama image decoding and GPU upload
//!
//! CPU side: [`PanoramaImage`] holds decoded RGBA8 pixels, produced from a
//! file, from in-memory bytes, or procedurally as a startup test pattern.
//! GPU side: [`PanoramaTexture`] owns the wgpu texture the sphere samples;
//! a hot-swap replaces the whole object, never blends into it.

use std::path::Path;

use thiserror::Error;

/// Errors from reading or decoding a panorama image
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to read image file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decoded equirectangular image, RGBA8
#[derive(Debug)]
pub struct PanoramaImage {
    /// Pixel data, row-major RGBA
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl PanoramaImage {
    /// Decode an image file from disk
    pub fn from_path(path: &Path) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Decode an image from in-memory bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TextureError> {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = decoded.dimensions();
        Ok(Self {
            data: decoded.into_raw(),
            width,
            height,
        })
    }

    /// Procedural equirectangular test pattern.
    ///
    /// Sky-to-ground vertical gradient with a longitude/latitude grid every
    /// 30 degrees, so orientation and drift are visible before a real image
    /// is loaded.
    pub fn test_pattern(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut data = Vec::with_capacity((width * height * 4) as usize);

        // 30 degrees of longitude/latitude in pixels
        let grid_x = (width / 12).max(1);
        let grid_y = (height / 6).max(1);

        for y in 0..height {
            let t = y as f32 / height as f32;
            for x in 0..width {
                let on_grid = x % grid_x < 2 || y % grid_y < 2;
                let (r, g, b) = if on_grid {
                    (90, 90, 90)
                } else {
                    // Light sky fading into a dark floor
                    (
                        (40.0 + 90.0 * (1.0 - t)) as u8,
                        (70.0 + 120.0 * (1.0 - t)) as u8,
                        (110.0 + 130.0 * (1.0 - t)) as u8,
                    )
                };
                data.extend_from_slice(&[r, g, b, 255]);
            }
        }

        Self {
            data,
            width,
            height,
        }
    }
}

/// GPU texture holding the current panorama surface
pub struct PanoramaTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl PanoramaTexture {
    /// Create a texture from a decoded image and upload its pixels
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &PanoramaImage) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Panorama Texture"),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * 4),
                rows_per_image: Some(image.height),
            },
            wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            width: image.width,
            height: image.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_dimensions() {
        let img = PanoramaImage::test_pattern(512, 256);
        assert_eq!(img.width, 512);
        assert_eq!(img.height, 256);
        assert_eq!(img.data.len(), 512 * 256 * 4);
        // Fully opaque
        assert!(img.data.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_pattern_never_degenerate() {
        let img = PanoramaImage::test_pattern(0, 0);
        assert_eq!((img.width, img.height), (1, 1));
        assert_eq!(img.data.len(), 4);
    }

    #[test]
    fn test_malformed_bytes_rejected() {
        let err = PanoramaImage::from_bytes(b"not an image").unwrap_err();
        assert!(matches!(err, TextureError::Decode(_)));
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = PanoramaImage::from_path(Path::new("/nonexistent/pano.jpg")).unwrap_err();
        assert!(matches!(err, TextureError::Read(_)));
    }
}
