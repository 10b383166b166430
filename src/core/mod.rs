// pixeltune/src/core/mod.rs
mod processor;
mod resolver;
mod session;

pub use processor::ImageProcessor;
pub use resolver::{parse_dimension, resolve, Edit};
pub use session::{
    ApplyRequest, Download, DownloadTarget, EditorSession, GenerateRequest, SourceFile,
};

use crate::utils::{calculate_aspect_ratio, data_url};
use std::sync::Arc;
use thiserror::Error;

/// Longest side the engine will allocate a surface for.
pub const MAX_DIMENSION: u32 = 100_000;

/// Largest surface area the engine will allocate.
pub const MAX_PIXELS: u64 = 268_435_456;

pub const DEFAULT_QUALITY: u8 = 90;
pub const DEFAULT_SCALE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeAlgorithm {
    Bilinear,
    Bicubic,
    #[default]
    Lanczos3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    /// File extension used for downloads: the MIME subtype.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    /// Lossless formats ignore the quality setting.
    pub fn is_lossless(self) -> bool {
        matches!(self, Self::Png)
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::WebP => image::ImageFormat::WebP,
        }
    }
}

/// A decoded, validated upload. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct SourceImage {
    name: String,
    bytes: Arc<[u8]>,
    width: u32,
    height: u32,
    media_type: String,
}

impl SourceImage {
    pub(crate) fn new(
        name: impl Into<String>,
        bytes: Arc<[u8]>,
        width: u32,
        height: u32,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            bytes,
            width,
            height,
            media_type: media_type.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn aspect_ratio(&self) -> f32 {
        calculate_aspect_ratio(self.width, self.height)
    }

    pub fn display_handle(&self) -> String {
        data_url(&self.media_type, &self.bytes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingOptions {
    pub width: u32,
    pub height: u32,
    pub keep_aspect: bool,
    pub quality: u8,
    pub format: OutputFormat,
    pub scale: u32,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            keep_aspect: true,
            quality: DEFAULT_QUALITY,
            format: OutputFormat::Jpeg,
            scale: DEFAULT_SCALE,
        }
    }
}

impl ProcessingOptions {
    /// Options as they stand right after `source` is loaded.
    pub fn for_source(source: &SourceImage) -> Self {
        Self {
            width: source.width(),
            height: source.height(),
            format: OutputFormat::from_mime(source.media_type()).unwrap_or_default(),
            ..Self::default()
        }
    }
}

/// Output of one apply. Replaced wholesale on the next apply.
#[derive(Debug, Clone)]
pub struct ProcessedResult {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

impl ProcessedResult {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn display_handle(&self) -> String {
        data_url(self.format.mime_type(), &self.bytes)
    }

    /// Whole-percent reduction against `original_size`; negative when the
    /// output grew. `None` for an empty original.
    pub fn savings_against(&self, original_size: u64) -> Option<i64> {
        crate::utils::savings_percent(original_size, self.size())
    }
}

#[derive(Debug, Clone)]
pub struct AiResult {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub prompt: String,
}

impl AiResult {
    pub fn display_handle(&self) -> String {
        data_url(&self.media_type, &self.bytes)
    }
}

/// Which user-facing bucket an error falls into at the trigger boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Load,
    Processing,
    Ai,
    Usage,
}

#[derive(Error, Debug)]
pub enum PixelTuneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Failed to load image: {0}")]
    Load(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Cannot allocate a {width}x{height} surface")]
    Surface { width: u32, height: u32 },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("{0}")]
    Ai(String),

    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("No image loaded")]
    NoImage,

    #[error("{0} already in progress")]
    Busy(&'static str),

    #[error("{0} result belongs to an image that is no longer loaded")]
    Superseded(&'static str),
}

impl PixelTuneError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedMediaType(_) | Self::Load(_) => ErrorKind::Load,
            Self::Decode(_) | Self::Surface { .. } | Self::Encode(_) => ErrorKind::Processing,
            Self::Ai(_) | Self::EmptyPrompt => ErrorKind::Ai,
            Self::Io(_) | Self::InvalidParameter(_) | Self::NoImage
            | Self::Busy(_)
            | Self::Superseded(_) => ErrorKind::Usage,
        }
    }

    /// The notice shown to the user when an operation fails.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedMediaType(_) => "Please select an image file".to_string(),
            Self::Load(_) => "Failed to load image".to_string(),
            Self::Decode(_) | Self::Surface { .. } | Self::Encode(_) => {
                "Processing failed".to_string()
            }
            Self::Ai(message) if message.trim().is_empty() => "AI Generation failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for PixelTuneError {
    fn from(e: reqwest::Error) -> Self {
        PixelTuneError::Ai(e.to_string())
    }
}

impl From<serde_json::Error> for PixelTuneError {
    fn from(e: serde_json::Error) -> Self {
        PixelTuneError::Ai(format!("Malformed response: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, PixelTuneError>;
