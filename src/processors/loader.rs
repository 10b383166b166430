// pixeltune/src/processors/loader.rs
use crate::core::{PixelTuneError, Result, SourceImage, MAX_DIMENSION};
use crate::processors::metadata::MetadataProcessor;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct Loader {
    max_dimensions: Option<(u32, u32)>,
    metadata_processor: MetadataProcessor,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_dimensions: Some((MAX_DIMENSION, MAX_DIMENSION)),
            metadata_processor: MetadataProcessor::new(),
        }
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_dimensions = Some((width, height));
        self
    }

    /// Reads a file from disk, declaring its media type from the extension.
    pub fn load_path(&self, path: &Path) -> Result<SourceImage> {
        log::debug!("Loading image from: {}", path.display());

        let bytes = std::fs::read(path)
            .map_err(|e| PixelTuneError::Load(format!("{}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let declared_type = crate::utils::declared_media_type(path);

        self.load(name, &declared_type, bytes)
    }

    /// Validates and decodes an upload.
    ///
    /// The declared type must be an `image/*` type; the bytes must decode.
    /// Reported dimensions are after EXIF orientation is applied.
    pub fn load(
        &self,
        name: impl Into<String>,
        declared_type: &str,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<SourceImage> {
        let name = name.into();
        if !declared_type.starts_with("image/") {
            return Err(PixelTuneError::UnsupportedMediaType(format!(
                "{} ({})",
                name,
                if declared_type.is_empty() { "unknown" } else { declared_type }
            )));
        }

        let bytes: Arc<[u8]> = bytes.into();
        if bytes.is_empty() {
            return Err(PixelTuneError::Load(format!("File is empty: {}", name)));
        }

        let image = self
            .decode(&bytes)
            .map_err(|e| PixelTuneError::Load(format!("{}: {}", name, e)))?;
        let (width, height) = image.dimensions();

        if let Some((max_w, max_h)) = self.max_dimensions {
            if width > max_w || height > max_h {
                return Err(PixelTuneError::Load(format!(
                    "Image dimensions {}x{} exceed maximum {}x{}",
                    width, height, max_w, max_h
                )));
            }
        }

        log::info!(
            "Loaded image {}: {}x{} pixels, {} bytes, {}",
            name,
            width,
            height,
            bytes.len(),
            declared_type
        );

        Ok(SourceImage::new(name, bytes, width, height, declared_type))
    }

    /// Decodes raw bytes into an upright pixel surface.
    pub fn decode(&self, data: &[u8]) -> std::result::Result<DynamicImage, image::ImageError> {
        let image = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(image::ImageError::IoError)?
            .decode()?;

        let orientation = self.metadata_processor.read_orientation(data);
        Ok(self.metadata_processor.apply_orientation(image, orientation))
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_load_reports_dimensions() {
        let source = Loader::new()
            .load("a.png", "image/png", png_bytes(40, 20))
            .unwrap();

        assert_eq!((source.width(), source.height()), (40, 20));
        assert_eq!(source.media_type(), "image/png");
        assert_eq!(source.name(), "a.png");
        assert!(source.byte_size() > 0);
    }

    #[test]
    fn test_rejects_non_image_type() {
        let err = Loader::new()
            .load("notes.txt", "text/plain", png_bytes(4, 4))
            .unwrap_err();
        assert!(matches!(err, PixelTuneError::UnsupportedMediaType(_)));
    }

    #[test]
    fn test_rejects_undecodable_bytes() {
        let err = Loader::new()
            .load("fake.jpg", "image/jpeg", b"just some text".to_vec())
            .unwrap_err();
        assert!(matches!(err, PixelTuneError::Load(_)));
    }

    #[test]
    fn test_rejects_empty_file() {
        let err = Loader::new()
            .load("empty.png", "image/png", Vec::new())
            .unwrap_err();
        assert!(matches!(err, PixelTuneError::Load(_)));
    }

    #[test]
    fn test_load_path_declares_type_from_extension() {
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        std::fs::write(file.path(), png_bytes(6, 3)).unwrap();

        let source = Loader::new().load_path(file.path()).unwrap();
        assert_eq!(source.media_type(), "image/png");
        assert_eq!((source.width(), source.height()), (6, 3));
    }

    #[test]
    fn test_max_dimensions() {
        let err = Loader::new()
            .with_max_dimensions(10, 10)
            .load("big.png", "image/png", png_bytes(11, 4))
            .unwrap_err();
        assert!(matches!(err, PixelTuneError::Load(_)));
    }
}
