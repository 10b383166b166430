// pixeltune/src/processors/mod.rs
mod compressor;
mod loader;
mod metadata;
mod resizer;

pub use compressor::{Compressor, JPEG_MAX_DIMENSION, WEBP_MAX_DIMENSION};
pub use loader::Loader;
pub use metadata::MetadataProcessor;
pub use resizer::Resizer;
