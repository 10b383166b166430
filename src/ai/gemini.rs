// pixeltune/src/ai/gemini.rs
use super::AiCollaborator;
use crate::core::{AiResult, PixelTuneError, Result, SourceImage};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_ANALYZE_MODEL: &str = "gemini-2.5-flash";

const ANALYZE_PROMPT: &str = "Suggest 3 short, creative edits (at most 6 words each) \
that an AI image editor could make to this photo. Reply with only the suggestions, \
separated by a '|' character.";

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub api_base: String,
    pub edit_model: String,
    pub analyze_model: String,
    pub timeout: Duration,
}

impl AiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            edit_model: DEFAULT_EDIT_MODEL.to_string(),
            analyze_model: DEFAULT_ANALYZE_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            model
        )
    }
}

/// Client for the hosted `generateContent` endpoint.
pub struct GeminiClient {
    config: AiConfig,
    http: Client,
}

impl GeminiClient {
    pub fn new(config: AiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(PixelTuneError::Ai(
                "API key is not configured (set GEMINI_API_KEY)".to_string(),
            ));
        }

        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    fn generate(&self, model: &str, source: &SourceImage, text: &str) -> Result<GenerateResponse> {
        let url = self.config.endpoint(model);
        log::debug!("POST {} ({} byte image)", url, source.byte_size());

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&GenerateRequest::new(source, text))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(PixelTuneError::Ai(error_message(status.as_u16(), &body)));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl AiCollaborator for GeminiClient {
    fn analyze(&self, source: &SourceImage) -> Result<String> {
        let response = self.generate(&self.config.analyze_model, source, ANALYZE_PROMPT)?;
        Ok(response.text())
    }

    fn edit(&self, source: &SourceImage, prompt: &str) -> Result<AiResult> {
        let response = self.generate(&self.config.edit_model, source, prompt)?;
        let result = response.into_image(prompt)?;
        log::info!(
            "AI edit produced {} bytes ({})",
            result.bytes.len(),
            result.media_type
        );
        Ok(result)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

impl GenerateRequest {
    fn new(source: &SourceImage, text: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: source.media_type().to_string(),
                            data: BASE64.encode(source.bytes()),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(text.to_string()),
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates.iter().flat_map(|c| c.content.parts.iter())
    }

    fn text(&self) -> String {
        self.parts()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
            .trim()
            .to_string()
    }

    fn into_image(self, prompt: &str) -> Result<AiResult> {
        if let Some(inline) = self.parts().find_map(|p| p.inline_data.as_ref()) {
            let bytes = BASE64
                .decode(inline.data.as_bytes())
                .map_err(|e| PixelTuneError::Ai(format!("Malformed image data: {}", e)))?;
            return Ok(AiResult {
                bytes,
                media_type: inline.mime_type.clone(),
                prompt: prompt.to_string(),
            });
        }

        if let Some(reason) = self.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref()) {
            return Err(PixelTuneError::Ai(format!("Request blocked: {}", reason)));
        }

        let text = self.text();
        if !text.is_empty() {
            return Err(PixelTuneError::Ai(text));
        }

        let reason = self
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .unwrap_or("no candidates");
        Err(PixelTuneError::Ai(format!("No image generated ({})", reason)))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// The service's own error message when the body carries one.
fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.trim().is_empty() => parsed.error.message,
        _ => format!("Request failed with status {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn source() -> SourceImage {
        let bytes: Arc<[u8]> = Arc::from(vec![1u8, 2, 3]);
        SourceImage::new("a.png", bytes, 1, 1, "image/png")
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest::new(&source(), "add snow");
        let json = serde_json::to_value(&request).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "AQID");
        assert!(parts[0].get("text").is_none());
        assert_eq!(parts[1]["text"], "add snow");
    }

    #[test]
    fn test_endpoint() {
        let mut config = AiConfig::new("k");
        config.api_base = "http://localhost:8080/v1/".to_string();
        assert_eq!(
            config.endpoint("m"),
            "http://localhost:8080/v1/models/m:generateContent"
        );
    }

    #[test]
    fn test_image_reply() {
        let body = r#"{"candidates":[{"content":{"parts":[
            {"text":"Here you go"},
            {"inlineData":{"mimeType":"image/png","data":"AQID"}}
        ]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        let result = response.into_image("add snow").unwrap();
        assert_eq!(result.bytes, vec![1, 2, 3]);
        assert_eq!(result.media_type, "image/png");
        assert_eq!(result.prompt, "add snow");
    }

    #[test]
    fn test_text_only_reply_is_error() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"I can't do that."}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        let err = response.into_image("x").unwrap_err();
        assert_eq!(err.user_message(), "I can't do that.");
    }

    #[test]
    fn test_blocked_reply() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        let err = response.into_image("x").unwrap_err();
        assert_eq!(err.to_string(), "Request blocked: SAFETY");
    }

    #[test]
    fn test_suggestion_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":" a|b "},{"text":"|c"}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), "a|b |c");
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(error_message(429, body), "Quota exceeded");
        assert_eq!(error_message(502, "<html>"), "Request failed with status 502");
    }

    #[test]
    fn test_missing_key() {
        assert!(GeminiClient::new(AiConfig::new("  ")).is_err());
    }
}
