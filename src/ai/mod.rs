// pixeltune/src/ai/mod.rs
mod gemini;

pub use gemini::{
    AiConfig, GeminiClient, DEFAULT_ANALYZE_MODEL, DEFAULT_API_BASE, DEFAULT_EDIT_MODEL,
};

use crate::core::{AiResult, Result, SourceImage};

/// Separator between suggestions in an `analyze` reply.
pub const SUGGESTION_SEPARATOR: char = '|';

/// A remote generative image service.
pub trait AiCollaborator {
    /// Short edit ideas for `source`, separated by `|`.
    fn analyze(&self, source: &SourceImage) -> Result<String>;

    /// Applies the edit described by `prompt` to `source`.
    fn edit(&self, source: &SourceImage, prompt: &str) -> Result<AiResult>;
}

/// Splits an `analyze` reply into trimmed, non-empty suggestions.
pub fn parse_suggestions(raw: &str) -> Vec<String> {
    raw.split(SUGGESTION_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suggestions() {
        assert_eq!(
            parse_suggestions("Add a sunset|  Make it black and white |Remove the car"),
            vec!["Add a sunset", "Make it black and white", "Remove the car"]
        );
        assert_eq!(parse_suggestions("one||two|"), vec!["one", "two"]);
        assert!(parse_suggestions("").is_empty());
        assert!(parse_suggestions(" | ").is_empty());
    }
}
