use image::{ColorType, DynamicImage};
use std::path::Path;

use crate::error::{DatasetError, DatasetResult};

/// Single-channel floating-point image stored row-major.
///
/// Intensities are on the 0-255 scale of an 8-bit gray channel; 16-bit
/// sources are rescaled into that range.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayImage {
    width: u32,
    height: u32,
    pixels: Vec<f32>,
}

impl GrayImage {
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        let pixels = match img.color() {
            ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => img
                .to_luma16()
                .into_raw()
                .into_iter()
                .map(|v| v as f32 / 257.0)
                .collect(),
            _ => img.to_luma8().into_raw().into_iter().map(f32::from).collect(),
        };

        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Flattened pixels, row after row
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

/// Decode an image file into a grayscale float image
pub fn load_grayscale(path: &Path, split: &str) -> DatasetResult<GrayImage> {
    let img = image::open(path).map_err(|source| DatasetError::ImageRead {
        split: split.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    Ok(GrayImage::from_dynamic(&img))
}
