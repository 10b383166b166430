pub mod ai;
pub mod cli;
mod core;
mod processors;
mod utils;

pub use crate::ai::{parse_suggestions, AiCollaborator, AiConfig, GeminiClient};
pub use crate::cli::{Algorithm, Cli, Commands, Format};
pub use crate::core::{
    parse_dimension, resolve, AiResult, ApplyRequest, Download, DownloadTarget, Edit,
    EditorSession, ErrorKind, GenerateRequest, ImageProcessor, OutputFormat, PixelTuneError,
    ProcessedResult, ProcessingOptions, ResizeAlgorithm, Result, SourceFile, SourceImage,
    MAX_DIMENSION, MAX_PIXELS,
};
pub use crate::processors::{
    Compressor, Loader, MetadataProcessor, Resizer, JPEG_MAX_DIMENSION, WEBP_MAX_DIMENSION,
};
pub use crate::utils::{
    calculate_aspect_ratio, data_url, declared_media_type, download_file_name, format_file_size,
    savings_percent, unix_millis,
};

pub mod prelude {
    pub use crate::{
        AiCollaborator, Edit, EditorSession, ImageProcessor, OutputFormat, ProcessingOptions,
        ResizeAlgorithm,
    };
}
