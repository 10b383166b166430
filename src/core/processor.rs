// pixeltune/src/core/processor.rs
use super::{OutputFormat, PixelTuneError, ProcessedResult, ResizeAlgorithm, Result};
use crate::processors::{Compressor, Loader, Resizer};

/// The resample/re-encode engine.
///
/// Holds only configuration; every call decodes, resamples and encodes from
/// scratch, so one processor can be shared between callers.
#[derive(Clone)]
pub struct ImageProcessor {
    loader: Loader,
    resizer: Resizer,
    optimize_png: bool,
}

impl ImageProcessor {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self {
            loader: Loader::new(),
            resizer: Resizer::new(algorithm),
            optimize_png: true,
        }
    }

    pub fn with_png_optimization(mut self, optimize: bool) -> Self {
        self.optimize_png = optimize;
        self
    }

    pub fn algorithm(&self) -> ResizeAlgorithm {
        self.resizer.algorithm()
    }

    /// Redraws `source` at exactly `width` x `height` and encodes it.
    ///
    /// `quality` is 1-100 and is ignored for PNG. Fails with a decode error
    /// for unreadable input, a surface error for an unallocatable size and an
    /// encode error when `format` cannot hold the size or the encoder yields
    /// nothing.
    pub fn resample(
        &self,
        source: &[u8],
        width: u32,
        height: u32,
        format: OutputFormat,
        quality: u8,
    ) -> Result<ProcessedResult> {
        let image = self
            .loader
            .decode(source)
            .map_err(|e| PixelTuneError::Decode(e.to_string()))?;

        // Reject before drawing so an oversized target never allocates
        Resizer::check_surface(width, height)?;
        Compressor::check_codec_limits(width, height, format)?;

        let surface = self.resizer.resize_exact(&image, width, height)?;

        let compressor = Compressor::new(quality).with_png_optimization(self.optimize_png);
        let bytes = compressor.compress_to_bytes(&surface, format)?;

        log::info!(
            "Resampled {}x{} -> {}x{} {:?}: {} bytes",
            image.width(),
            image.height(),
            width,
            height,
            format,
            bytes.len()
        );

        Ok(ProcessedResult {
            bytes,
            width,
            height,
            format,
        })
    }
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new(ResizeAlgorithm::default())
    }
}
