// pixeltune/src/processors/compressor.rs
use crate::core::{OutputFormat, PixelTuneError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use oxipng::{optimize_from_memory, Options};
use std::io::Cursor;

/// Largest side a WebP bitstream can describe.
pub const WEBP_MAX_DIMENSION: u32 = 16_383;

/// Largest side a baseline JPEG frame header can describe.
pub const JPEG_MAX_DIMENSION: u32 = 65_535;

/// Serializes a pixel surface into JPEG, PNG or WebP bytes.
#[derive(Debug, Clone)]
pub struct Compressor {
    quality: u8,
    optimize_png: bool,
}

impl Compressor {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            optimize_png: true,
        }
    }

    pub fn with_png_optimization(mut self, optimize: bool) -> Self {
        self.optimize_png = optimize;
        self
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encodes `image` as `format`. PNG output does not depend on quality.
    pub fn compress_to_bytes(&self, image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
        log::debug!(
            "Encoding {}x{} image as {:?}, quality: {}",
            image.width(),
            image.height(),
            format,
            if format.is_lossless() { "n/a".to_string() } else { self.quality.to_string() }
        );

        Self::check_codec_limits(image.width(), image.height(), format)?;

        let data = match format {
            OutputFormat::Jpeg => self.encode_jpeg(image)?,
            OutputFormat::Png => self.encode_png(image)?,
            OutputFormat::WebP => self.encode_webp(image)?,
        };

        if data.is_empty() {
            return Err(PixelTuneError::Encode(format!(
                "{:?} encoder produced no data",
                format
            )));
        }

        log::debug!("Encoded {} bytes", data.len());
        Ok(data)
    }

    /// Fails with an encode error when `format` cannot describe a
    /// `width` x `height` image.
    pub fn check_codec_limits(width: u32, height: u32, format: OutputFormat) -> Result<()> {
        let limit = match format {
            OutputFormat::Jpeg => JPEG_MAX_DIMENSION,
            OutputFormat::WebP => WEBP_MAX_DIMENSION,
            OutputFormat::Png => return Ok(()),
        };

        if width > limit || height > limit {
            return Err(PixelTuneError::Encode(format!(
                "{:?} supports at most {} pixels per side, got {}x{}",
                format, limit, width, height
            )));
        }
        Ok(())
    }

    fn encode_jpeg(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        // JPEG carries no alpha channel
        let mut buffer = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
        image
            .to_rgb8()
            .write_with_encoder(encoder)
            .map_err(|e| PixelTuneError::Encode(format!("JPEG encode failed: {}", e)))?;
        Ok(buffer.into_inner())
    }

    fn encode_png(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| PixelTuneError::Encode(format!("PNG encode failed: {}", e)))?;

        if self.optimize_png {
            return self.optimize_png_bytes(&buffer.into_inner());
        }
        Ok(buffer.into_inner())
    }

    fn encode_webp(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let rgba = image.to_rgba8();
        let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());

        // Full quality switches to lossless, the way browsers treat 1.0
        let memory = encoder
            .encode_simple(self.quality >= 100, self.quality as f32)
            .map_err(|e| PixelTuneError::Encode(format!("WebP encode failed: {:?}", e)))?;

        Ok(memory.to_vec())
    }

    fn optimize_png_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        optimize_from_memory(data, &Options::default())
            .map_err(|e| PixelTuneError::Encode(format!("PNG optimization failed: {}", e)))
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(crate::core::DEFAULT_QUALITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x ^ y) % 256) as u8])
        }))
    }

    #[test]
    fn test_magic_numbers() {
        let image = gradient(16, 16);
        let compressor = Compressor::new(80);

        let jpeg = compressor.compress_to_bytes(&image, OutputFormat::Jpeg).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);

        let png = compressor.compress_to_bytes(&image, OutputFormat::Png).unwrap();
        assert_eq!(&png[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);

        let webp = compressor.compress_to_bytes(&image, OutputFormat::WebP).unwrap();
        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(Compressor::new(0).quality(), 1);
        assert_eq!(Compressor::new(255).quality(), 100);
    }

    #[test]
    fn test_png_ignores_quality() {
        let image = gradient(32, 24);
        let low = Compressor::new(10).compress_to_bytes(&image, OutputFormat::Png).unwrap();
        let high = Compressor::new(90).compress_to_bytes(&image, OutputFormat::Png).unwrap();
        assert_eq!(low, high);
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 0])));
        let jpeg = Compressor::new(90).compress_to_bytes(&image, OutputFormat::Jpeg).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_codec_limits() {
        let wide = DynamicImage::new_rgb8(WEBP_MAX_DIMENSION + 1, 1);
        for quality in [80, 100] {
            let err = Compressor::new(quality)
                .compress_to_bytes(&wide, OutputFormat::WebP)
                .unwrap_err();
            assert!(matches!(err, PixelTuneError::Encode(_)));
        }

        let tall = DynamicImage::new_rgb8(1, JPEG_MAX_DIMENSION + 1);
        let err = Compressor::new(90)
            .compress_to_bytes(&tall, OutputFormat::Jpeg)
            .unwrap_err();
        assert!(matches!(err, PixelTuneError::Encode(_)));

        assert!(Compressor::check_codec_limits(WEBP_MAX_DIMENSION, 1, OutputFormat::WebP).is_ok());
        assert!(Compressor::check_codec_limits(JPEG_MAX_DIMENSION, 1, OutputFormat::Jpeg).is_ok());
        assert!(Compressor::check_codec_limits(90_000, 1, OutputFormat::Png).is_ok());
    }

    #[test]
    fn test_webp_at_codec_maximum() {
        let image = gradient(WEBP_MAX_DIMENSION, 2);
        let webp = Compressor::new(60).compress_to_bytes(&image, OutputFormat::WebP).unwrap();
        let decoded = image::load_from_memory(&webp).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (WEBP_MAX_DIMENSION, 2));
    }

    #[test]
    fn test_unoptimized_png_decodes() {
        let image = gradient(12, 9);
        let png = Compressor::new(50)
            .with_png_optimization(false)
            .compress_to_bytes(&image, OutputFormat::Png)
            .unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 9));
    }
}
