//! Gemini (Google) image generation provider.

use crate::config::{resolve_api_key, Config};
use crate::error::{parse_retry_after, sanitize_error_message, CanvasError, Result};
use crate::image::codec::decode_base64_lenient;
use crate::image::provider::ImageProvider;
use crate::image::types::{GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Default Generative Language API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, economical).
    #[default]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image (highest quality).
    NanoBananaPro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "nano-banana-pro-preview",
        }
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for GeminiProvider.
#[derive(Debug, Clone)]
pub struct GeminiProviderBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: String,
}

impl Default for GeminiProviderBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            model: GeminiModel::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a resolved [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key: Some(config.api_key.clone()),
            model: config.model,
            base_url: config.base_url.clone(),
        }
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY`, then `API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<GeminiProvider> {
        let api_key = match self.api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => key,
            None => resolve_api_key(|name| std::env::var(name).ok())?,
        };

        Ok(GeminiProvider {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            base_url: self.base_url,
        })
    }
}

/// Gemini image generation provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
    base_url: String,
}

impl GeminiProvider {
    /// Creates a new `GeminiProviderBuilder`.
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    /// Returns the configured model.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    fn model_url(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model.as_str())
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        request.validate()?;
        let start = Instant::now();

        let url = format!("{}:generateContent", self.model_url());
        let body = GeminiRequest::from_generation_request(request);

        tracing::debug!(
            model = self.model.as_str(),
            images = request.images.len(),
            "sending Gemini generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let inline_data = gemini_response.into_image_part()?;

        let data = decode_base64_lenient(&inline_data.data)?;
        if data.is_empty() {
            return Err(CanvasError::NoImageData);
        }

        let format = ImageFormat::from_mime_type(&inline_data.mime_type)
            .or_else(|| ImageFormat::from_magic_bytes(&data))
            .unwrap_or(ImageFormat::Png);
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(bytes = data.len(), duration_ms, "Gemini returned image");

        Ok(GeneratedImage::new(
            data,
            format,
            GenerationMetadata {
                model: Some(self.model.as_str().to_string()),
                duration_ms: Some(duration_ms),
            },
        ))
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> CanvasError {
    let text = sanitize_error_message(text);
    if status == 404 {
        return CanvasError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        );
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
        return CanvasError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return CanvasError::Auth(text);
    }
    let lower = text.to_lowercase();
    if lower.contains("safety")
        || lower.contains("blocked")
        || lower.contains("prohibited")
    {
        return CanvasError::ContentBlocked(text);
    }
    CanvasError::Api {
        status,
        message: text,
    }
}

#[async_trait]
impl ImageProvider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        self.generate_impl(request).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        health_status(response.status().as_u16())
    }
}

/// Maps the status of a model lookup to the health check outcome.
fn health_status(status: u16) -> Result<()> {
    match status {
        401 | 403 => Err(CanvasError::Auth("Invalid API key".into())),
        404 => Err(CanvasError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        )),
        s if !(200..300).contains(&s) => Err(CanvasError::Api {
            status: s,
            message: "Health check failed".into(),
        }),
        _ => Ok(()),
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        // Images go first, in order, then the instruction.
        let mut parts: Vec<GeminiRequestPart> = req
            .images
            .iter()
            .map(|image| GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.format.mime_type().to_string(),
                    data: image.to_base64(),
                },
            })
            .collect();

        parts.push(GeminiRequestPart::Text {
            text: req.instruction.clone(),
        });

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    data: String,
}

impl GeminiResponse {
    /// Extracts the inline image from the first part of the first
    /// candidate.
    fn into_image_part(self) -> Result<InlineData> {
        // Blocks are reported with HTTP 200.
        if let Some(feedback) = self.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
                return Err(CanvasError::ContentBlocked(msg));
            }
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(CanvasError::NoImageData)?;

        if let Some(ref finish_reason) = candidate.finish_reason {
            match finish_reason.as_str() {
                "SAFETY"
                | "IMAGE_SAFETY"
                | "IMAGE_PROHIBITED_CONTENT"
                | "IMAGE_RECITATION"
                | "RECITATION"
                | "PROHIBITED_CONTENT"
                | "BLOCKLIST" => {
                    return Err(CanvasError::ContentBlocked(format!(
                        "Content blocked by Gemini safety filter: {}",
                        finish_reason
                    )));
                }
                _ => {}
            }
        }

        candidate
            .content
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.inline_data)
            .filter(|inline| !inline.data.is_empty())
            .ok_or(CanvasError::NoImageData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::types::InlineImage;

    fn parse(json: &str) -> GeminiResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_gemini_model_as_str() {
        assert_eq!(GeminiModel::NanoBanana.as_str(), "gemini-2.5-flash-image");
        assert_eq!(
            GeminiModel::NanoBananaPro.as_str(),
            "nano-banana-pro-preview"
        );
        assert_eq!(GeminiModel::default(), GeminiModel::NanoBanana);
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let provider = GeminiProviderBuilder::new()
            .api_key("test-key")
            .model(GeminiModel::NanoBananaPro)
            .base_url("http://localhost:9999/v1beta/")
            .build()
            .unwrap();
        assert_eq!(provider.model(), GeminiModel::NanoBananaPro);
        assert_eq!(
            provider.model_url(),
            "http://localhost:9999/v1beta/models/nano-banana-pro-preview"
        );
    }

    #[test]
    fn test_builder_from_config() {
        let config = Config::from_lookup(|_| Some("cfg-key".into()))
            .unwrap()
            .with_model(GeminiModel::NanoBananaPro);
        let provider = GeminiProviderBuilder::from_config(&config).build().unwrap();
        assert_eq!(provider.api_key, "cfg-key");
        assert_eq!(provider.model(), GeminiModel::NanoBananaPro);
    }

    #[test]
    fn test_request_text_only() {
        let req = GenerationRequest::new("A lighthouse at dusk");
        let json = serde_json::to_value(GeminiRequest::from_generation_request(&req)).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "A lighthouse at dusk");
        assert_eq!(
            json["generationConfig"]["responseModalities"],
            serde_json::json!(["IMAGE"])
        );
        assert!(json.get("generation_config").is_none());
    }

    #[test]
    fn test_request_two_images_then_text() {
        let a = InlineImage::new(vec![0xFF, 0xD8, 0xFF], ImageFormat::Jpeg);
        let b = InlineImage::new(vec![0x89, 0x50, 0x4E, 0x47], ImageFormat::Png);
        let req = GenerationRequest::new("merge").with_image(a).with_image(b);
        let json = serde_json::to_value(GeminiRequest::from_generation_request(&req)).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "/9j/");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[2]["text"], "merge");
    }

    #[test]
    fn test_response_first_part_image() {
        let resp = parse(
            r#"{
            "candidates": [{
                "content": {
                    "parts": [{
                        "inlineData": {
                            "mimeType": "image/png",
                            "data": "iVBORw0KGgo="
                        }
                    }]
                },
                "finishReason": "STOP"
            }]
        }"#,
        );
        let inline = resp.into_image_part().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "iVBORw0KGgo=");
    }

    #[test]
    fn test_response_no_image_data() {
        let resp = parse(r#"{"candidates": [{"content": {"parts": [{}]}}]}"#);
        assert!(matches!(
            resp.into_image_part(),
            Err(CanvasError::NoImageData)
        ));
    }

    #[test]
    fn test_response_text_before_image_is_no_image() {
        let resp = parse(
            r#"{"candidates": [{"content": {"parts": [
                {"text": "here you go"},
                {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
            ]}}]}"#,
        );
        assert!(matches!(
            resp.into_image_part(),
            Err(CanvasError::NoImageData)
        ));
    }

    #[test]
    fn test_response_no_candidates() {
        assert!(matches!(
            parse(r#"{}"#).into_image_part(),
            Err(CanvasError::NoImageData)
        ));
        assert!(matches!(
            parse(r#"{"candidates": [{}]}"#).into_image_part(),
            Err(CanvasError::NoImageData)
        ));
    }

    #[test]
    fn test_response_with_prompt_feedback_block() {
        let resp = parse(
            r#"{
            "candidates": [],
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked due to safety"
            }
        }"#,
        );
        match resp.into_image_part() {
            Err(CanvasError::ContentBlocked(msg)) => {
                assert_eq!(msg, "Prompt was blocked due to safety")
            }
            other => panic!("expected ContentBlocked, got {other:?}"),
        }
    }

    #[test]
    fn test_response_safety_finish_reason() {
        let resp = parse(r#"{"candidates": [{"finishReason": "IMAGE_SAFETY"}]}"#);
        assert!(matches!(
            resp.into_image_part(),
            Err(CanvasError::ContentBlocked(_))
        ));
    }

    #[test]
    fn test_parse_error_statuses() {
        let headers = reqwest::header::HeaderMap::new();
        assert!(matches!(
            parse_error(401, "bad key", &headers),
            CanvasError::Auth(_)
        ));
        assert!(matches!(
            parse_error(404, "", &headers),
            CanvasError::InvalidRequest(_)
        ));
        assert!(matches!(
            parse_error(429, "", &headers),
            CanvasError::RateLimited { retry_after: None }
        ));
        assert!(matches!(
            parse_error(400, "request blocked by policy", &headers),
            CanvasError::ContentBlocked(_)
        ));
        assert!(matches!(
            parse_error(500, "oops", &headers),
            CanvasError::Api { status: 500, .. }
        ));
    }

    #[tokio::test]
    async fn test_generate_rejects_three_images() {
        let provider = GeminiProvider::builder().api_key("k").build().unwrap();
        let img = InlineImage::new(vec![1], ImageFormat::Jpeg);
        let req = GenerationRequest::new("x")
            .with_image(img.clone())
            .with_image(img.clone())
            .with_image(img);
        assert!(matches!(
            provider.generate(&req).await,
            Err(CanvasError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_health_status() {
        assert!(health_status(200).is_ok());
        assert!(matches!(health_status(403), Err(CanvasError::Auth(_))));
        assert!(matches!(
            health_status(404),
            Err(CanvasError::InvalidRequest(_))
        ));
        assert!(matches!(
            health_status(503),
            Err(CanvasError::Api { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_health_check_unreachable_host() {
        let provider = GeminiProvider::builder()
            .api_key("k")
            .base_url("http://127.0.0.1:1/v1beta")
            .build()
            .unwrap();
        assert!(matches!(
            provider.health_check().await,
            Err(CanvasError::Network(_))
        ));
    }
}
