//! Static images sampled by passes as `iTextureK`.

use std::path::Path;

/// CPU-side RGBA8 pixels for a static texture, uploaded once per compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticImage {
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
}

impl StaticImage {
    /// Wraps raw RGBA8 data. Returns `None` if the length does not match the size.
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A single-colour image, handy as a placeholder input.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Load an image file and convert it to RGBA8.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            pixels: img.into_raw(),
        })
    }

    /// Decode an image from encoded bytes (PNG, JPEG, ...).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            pixels: img.into_raw(),
        })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
