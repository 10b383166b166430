// pixeltune/src/processors/resizer.rs
use crate::core::{PixelTuneError, ResizeAlgorithm, Result, MAX_DIMENSION, MAX_PIXELS};
use image::{imageops::FilterType, DynamicImage};

/// Draws an image onto a surface of exactly the requested size.
#[derive(Debug, Clone, Copy)]
pub struct Resizer {
    algorithm: ResizeAlgorithm,
}

impl Resizer {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> ResizeAlgorithm {
        self.algorithm
    }

    /// Resamples `image` to `width` x `height`, ignoring its aspect ratio.
    pub fn resize_exact(&self, image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
        Self::check_surface(width, height)?;

        if width == image.width() && height == image.height() {
            log::debug!("Image dimensions unchanged, skipping resize");
            return Ok(image.clone());
        }

        log::debug!(
            "Resizing image from {}x{} to {}x{} ({:?})",
            image.width(),
            image.height(),
            width,
            height,
            self.algorithm
        );

        Ok(image.resize_exact(width, height, self.filter_type()))
    }

    /// Fails with a surface error for a zero side, a side past the limit or
    /// an area past the pixel budget.
    pub fn check_surface(width: u32, height: u32) -> Result<()> {
        if width == 0
            || height == 0
            || width > MAX_DIMENSION
            || height > MAX_DIMENSION
            || width as u64 * height as u64 > MAX_PIXELS
        {
            return Err(PixelTuneError::Surface { width, height });
        }
        Ok(())
    }

    fn filter_type(&self) -> FilterType {
        match self.algorithm {
            ResizeAlgorithm::Bilinear => FilterType::Triangle,
            ResizeAlgorithm::Bicubic => FilterType::CatmullRom,
            ResizeAlgorithm::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(ResizeAlgorithm::default())
    }
}
