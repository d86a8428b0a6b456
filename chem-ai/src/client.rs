//! HTTP client for the hosted generative-language service.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use chem_core::{AnalysisRequest, AnalysisResult, CurriculumLevel, StillImage};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::classify::classify_status;
use crate::error::{AiResult, AnalysisError};
use crate::prompt::build_prompt;
use crate::schema::response_schema;
use crate::wire::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part,
};

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default service root.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client configuration.
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// API key; requests fail with an auth error when absent.
    pub api_key: Option<String>,
    /// Model name, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Service root URL.
    pub endpoint: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Anything that can turn an [`AnalysisRequest`] into an [`AnalysisResult`].
///
/// Implementations are stateless from the caller's point of view; the
/// caller serialises requests.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Dispatch exactly one request.
    ///
    /// # Errors
    ///
    /// Returns the classified [`AnalysisError`] when the request fails.
    async fn analyze(&self, request: &AnalysisRequest) -> AiResult<AnalysisResult>;

    /// Validate raw input and dispatch it.
    ///
    /// # Errors
    ///
    /// Fails with [`AnalysisError::Validation`] before any I/O when both
    /// `image` and `text` are absent, otherwise as [`AnalysisBackend::analyze`].
    async fn analyze_input(
        &self,
        image: Option<StillImage>,
        text: Option<&str>,
        level: CurriculumLevel,
    ) -> AiResult<AnalysisResult> {
        let request = AnalysisRequest::new(image, text, level)?;
        self.analyze(&request).await
    }
}

/// `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<InnerClient>,
}

struct InnerClient {
    http: Client,
    url: Url,
    api_key: Option<String>,
    model: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("url", &self.inner.url.as_str())
            .field("model", &self.inner.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] if the endpoint is not a URL
    /// or the model name is empty, and [`AnalysisError::Transport`] if the
    /// HTTP client fails to build.
    pub fn new(config: AnalyzerConfig) -> AiResult<Self> {
        let model = config.model.trim().to_string();
        if model.is_empty() {
            return Err(AnalysisError::InvalidConfig("model name is empty".to_string()));
        }

        let mut url = Url::parse(&config.endpoint)
            .map_err(|e| AnalysisError::InvalidConfig(format!("endpoint: {e}")))?;
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base}/v1beta/models/{model}:generateContent"));

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("chemsketch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_key = config.api_key.filter(|k| !k.trim().is_empty());

        Ok(Self {
            inner: Arc::new(InnerClient {
                http,
                url,
                api_key,
                model,
            }),
        })
    }

    /// The fully resolved `generateContent` URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// Build the request body: zero or one image part followed by one text part.
    #[must_use]
    pub fn build_request(request: &AnalysisRequest) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(2);

        if let Some(image) = request.image() {
            // Requests only ever carry PNG or JPEG stills.
            let mime = image.format().mime_type();
            let data = base64::engine::general_purpose::STANDARD.encode(image.bytes());
            parts.push(Part::inline(mime, data));
        }

        parts.push(Part::text(build_prompt(
            request.level(),
            request.text(),
            request.image().is_some(),
        )));

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        }
    }

    async fn dispatch(&self, request: &AnalysisRequest) -> AiResult<AnalysisResult> {
        let Some(api_key) = self.inner.api_key.as_deref() else {
            return Err(AnalysisError::Auth("missing API key".to_string()));
        };

        let body = Self::build_request(request);
        debug!(
            request_id = %request.id(),
            level = ?request.level(),
            image_bytes = request.image().map_or(0, StillImage::len),
            has_text = request.text().is_some(),
            "Dispatching analysis request"
        );

        let response = self
            .inner
            .http
            .post(self.inner.url.clone())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        parse_response(status.as_u16(), &raw)
    }
}

#[async_trait]
impl AnalysisBackend for GeminiClient {
    async fn analyze(&self, request: &AnalysisRequest) -> AiResult<AnalysisResult> {
        match self.dispatch(request).await {
            Ok(result) => {
                info!(request_id = %request.id(), name = %result.name, "Analysis succeeded");
                Ok(result)
            }
            Err(err) => {
                warn!(
                    request_id = %request.id(),
                    category = ?err.category(),
                    error = %err,
                    "Analysis failed"
                );
                Err(err)
            }
        }
    }
}

/// Turn a raw HTTP status and body into a result.
///
/// A body that is not JSON is malformed whatever the status. Non-2xx
/// statuses are classified from the error envelope. Blocked prompts and
/// safety stops are content-policy failures.
///
/// # Errors
///
/// Returns the classified [`AnalysisError`] for every failure mode.
pub fn parse_response(http_status: u16, raw: &str) -> AiResult<AnalysisResult> {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        AnalysisError::MalformedResponse(format!("HTTP {http_status}: body is not JSON: {e}"))
    })?;

    if !(200..300).contains(&http_status) {
        let description = serde_json::from_value::<ErrorEnvelope>(value.clone())
            .map_or_else(|_| format!("{http_status} {value}"), |e| e.error.description(http_status));
        let category = classify_status(http_status, &description);
        return Err(AnalysisError::from_category(category, &description));
    }

    let response: GenerateContentResponse = serde_json::from_value(value)
        .map_err(|e| AnalysisError::MalformedResponse(format!("unexpected envelope: {e}")))?;

    if let Some(reason) = response.block_reason() {
        return Err(AnalysisError::ContentPolicy(reason));
    }

    let text = response
        .first_text()
        .ok_or_else(|| AnalysisError::MalformedResponse("no candidate text".to_string()))?;

    serde_json::from_str(&text)
        .map_err(|e| AnalysisError::MalformedResponse(format!("result does not match schema: {e}")))
}
