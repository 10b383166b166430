// pixeltune/src/core/session.rs
use super::resolver::{resolve, Edit};
use super::{
    AiResult, ImageProcessor, OutputFormat, PixelTuneError, ProcessedResult, ProcessingOptions,
    Result, SourceImage,
};
use crate::ai::{parse_suggestions, AiCollaborator};
use crate::processors::Loader;
use crate::utils::download_file_name;
use std::path::Path;
use std::sync::Arc;

/// A file handed over by the picker: name, declared media type and contents.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub declared_type: String,
    pub bytes: Vec<u8>,
}

/// Snapshot of everything one apply needs, detached from the session.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    generation: u64,
    source: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: u8,
}

impl ApplyRequest {
    pub fn run(&self, processor: &ImageProcessor) -> Result<ProcessedResult> {
        processor.resample(&self.source, self.width, self.height, self.format, self.quality)
    }
}

/// Snapshot of everything one AI edit needs, detached from the session.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    generation: u64,
    source: SourceImage,
    pub prompt: String,
}

impl GenerateRequest {
    pub fn run(&self, ai: &dyn AiCollaborator) -> Result<AiResult> {
        ai.edit(&self.source, &self.prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadTarget {
    Adjusted,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download<'a> {
    pub file_name: String,
    pub bytes: &'a [u8],
}

/// Owns all mutable editor state for one session.
///
/// Long operations are split into `begin_*` (snapshot + busy flag) and
/// `finish_*` (store result, clear flag) so a caller can run the work
/// elsewhere; `apply` and `generate` do both in one call. A failed operation
/// leaves the previous state in place.
///
/// Every load or clear starts a new generation. Requests are stamped with
/// the generation they were taken from, and a `finish_*` for an older
/// generation is discarded.
#[derive(Default)]
pub struct EditorSession {
    loader: Loader,
    source: Option<SourceImage>,
    options: ProcessingOptions,
    processed: Option<ProcessedResult>,
    prompt: String,
    ai_result: Option<AiResult>,
    suggestions: Vec<String>,
    applying: bool,
    generating: bool,
    generation: u64,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    pub fn processed(&self) -> Option<&ProcessedResult> {
        self.processed.as_ref()
    }

    pub fn ai_result(&self) -> Option<&AiResult> {
        self.ai_result.as_ref()
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn is_applying(&self) -> bool {
        self.applying
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Size of what the adjusted download would currently produce.
    pub fn processed_size(&self) -> Option<u64> {
        match (&self.processed, &self.source) {
            (Some(processed), _) => Some(processed.size()),
            (None, Some(source)) => Some(source.byte_size()),
            (None, None) => None,
        }
    }

    /// Replaces the session's image. Options reset to the new image's
    /// defaults and earlier results are dropped.
    pub fn load(&mut self, file: SourceFile) -> Result<&SourceImage> {
        let source = self.loader.load(file.name, &file.declared_type, file.bytes)?;
        Ok(self.install(source))
    }

    pub fn load_path(&mut self, path: &Path) -> Result<&SourceImage> {
        let source = self.loader.load_path(path)?;
        Ok(self.install(source))
    }

    fn install(&mut self, source: SourceImage) -> &SourceImage {
        self.next_generation();
        self.options = ProcessingOptions::for_source(&source);
        self.processed = None;
        self.ai_result = None;
        self.suggestions.clear();
        self.source.insert(source)
    }

    pub fn edit(&mut self, edit: Edit) -> &ProcessingOptions {
        self.options = resolve(&self.options, edit);
        &self.options
    }

    pub fn begin_apply(&mut self) -> Result<ApplyRequest> {
        let source = self.source.as_ref().ok_or(PixelTuneError::NoImage)?;
        if self.applying {
            return Err(PixelTuneError::Busy("Apply"));
        }

        self.applying = true;
        Ok(ApplyRequest {
            generation: self.generation,
            source: source.shared_bytes(),
            width: self.options.width,
            height: self.options.height,
            format: self.options.format,
            quality: self.options.quality,
        })
    }

    /// Stores the outcome of `request`. An outcome for an image that has
    /// since been replaced or cleared is dropped with `Superseded`.
    pub fn finish_apply(
        &mut self,
        request: &ApplyRequest,
        outcome: Result<ProcessedResult>,
    ) -> Result<&ProcessedResult> {
        if request.generation != self.generation {
            log::debug!("Dropping apply result from generation {}", request.generation);
            return Err(PixelTuneError::Superseded("Apply"));
        }

        self.applying = false;
        let processed = outcome?;
        Ok(&*self.processed.insert(processed))
    }

    pub fn apply(&mut self, processor: &ImageProcessor) -> Result<&ProcessedResult> {
        let request = self.begin_apply()?;
        let outcome = request.run(processor);
        self.finish_apply(&request, outcome)
    }

    /// Asks the collaborator for edit ideas. Failures leave the list empty.
    pub fn refresh_suggestions(&mut self, ai: &dyn AiCollaborator) -> &[String] {
        self.suggestions.clear();
        if let Some(source) = &self.source {
            match ai.analyze(source) {
                Ok(raw) => self.suggestions = parse_suggestions(&raw),
                Err(e) => log::debug!("Suggestion request failed: {}", e),
            }
        }
        &self.suggestions
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Copies suggestion `index` into the prompt.
    pub fn apply_suggestion(&mut self, index: usize) -> Option<&str> {
        let suggestion = self.suggestions.get(index)?.clone();
        self.prompt = suggestion;
        Some(&self.prompt)
    }

    pub fn begin_generate(&mut self) -> Result<GenerateRequest> {
        let source = self.source.as_ref().ok_or(PixelTuneError::NoImage)?;
        if self.prompt.trim().is_empty() {
            return Err(PixelTuneError::EmptyPrompt);
        }
        if self.generating {
            return Err(PixelTuneError::Busy("Generation"));
        }

        self.generating = true;
        Ok(GenerateRequest {
            generation: self.generation,
            source: source.clone(),
            prompt: self.prompt.clone(),
        })
    }

    pub fn finish_generate(
        &mut self,
        request: &GenerateRequest,
        outcome: Result<AiResult>,
    ) -> Result<&AiResult> {
        if request.generation != self.generation {
            log::debug!("Dropping AI result from generation {}", request.generation);
            return Err(PixelTuneError::Superseded("Generation"));
        }

        self.generating = false;
        let result = outcome?;
        Ok(&*self.ai_result.insert(result))
    }

    pub fn generate(&mut self, ai: &dyn AiCollaborator) -> Result<&AiResult> {
        let request = self.begin_generate()?;
        let outcome = request.run(ai);
        self.finish_generate(&request, outcome)
    }

    /// The file a download of `target` would save, named for `unix_millis`.
    ///
    /// Before the first apply the adjusted target is the original upload.
    pub fn download(&self, target: DownloadTarget, unix_millis: u128) -> Option<Download<'_>> {
        match target {
            DownloadTarget::Ai => self.ai_result.as_ref().map(|result| Download {
                file_name: download_file_name(unix_millis, "png"),
                bytes: &result.bytes,
            }),
            DownloadTarget::Adjusted => match (&self.processed, &self.source) {
                (Some(processed), _) => Some(Download {
                    file_name: download_file_name(unix_millis, processed.format.extension()),
                    bytes: &processed.bytes,
                }),
                (None, Some(source)) => {
                    let ext = source.media_type().split('/').nth(1).unwrap_or("jpeg");
                    Some(Download {
                        file_name: download_file_name(unix_millis, ext),
                        bytes: source.bytes(),
                    })
                }
                (None, None) => None,
            },
        }
    }

    pub fn clear(&mut self) {
        self.next_generation();
        self.source = None;
        self.processed = None;
        self.ai_result = None;
        self.prompt.clear();
        self.suggestions.clear();
    }

    // In-flight requests belong to the old image; their busy flags go with it
    fn next_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.applying = false;
        self.generating = false;
    }
}
