//! OpenAI-compatible Provider - Streaming chat completions over SSE.
//!
//! Talks to any endpoint implementing the OpenAI `chat/completions` wire
//! format (OpenRouter by default, also Ollama/OpenAI itself).
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(Some(api_key))
//!     .with_base_url("https://openrouter.ai/api/v1")
//!     .with_attribution("https://i.rickey.io", "Merlin Magician Chat");
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```
//!
//! # Streaming
//!
//! The response body is split into lines across network chunks. Each
//! `data:` line is parsed and yielded as a `StreamChunk` until the `[DONE]`
//! marker is received. Comment lines (keep-alives) are ignored.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, ChunkStream, CompletionRequest, FinishReason, ProviderInfo, StreamChunk,
};

/// Configuration for the OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication. Requests go out unauthenticated without one.
    api_key: Option<Secret<String>>,
    /// Base URL for the API.
    pub base_url: String,
    /// Connect timeout. The stream itself is not bounded.
    pub connect_timeout: Duration,
    /// Sent as `HTTP-Referer` for upstream attribution.
    pub site_url: Option<String>,
    /// Sent as `X-Title` for upstream attribution.
    pub site_name: Option<String>,
    /// Forwarded verbatim as `keep_alive`.
    pub keep_alive: Option<String>,
    /// When set, requests reasoning at this effort with the reasoning excluded.
    pub reasoning_effort: Option<String>,
    /// Optional stop sequence.
    pub stop: Option<String>,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()).map(Secret::new),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            connect_timeout: Duration::from_secs(30),
            site_url: None,
            site_name: None,
            keep_alive: None,
            reasoning_effort: None,
            stop: None,
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the attribution headers.
    pub fn with_attribution(
        mut self,
        site_url: impl Into<String>,
        site_name: impl Into<String>,
    ) -> Self {
        self.site_url = Some(site_url.into());
        self.site_name = Some(site_name.into());
        self
    }

    /// Sets the keep-alive value forwarded upstream.
    pub fn with_keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }

    /// Requests hidden reasoning at the given effort.
    pub fn with_reasoning_effort(mut self, effort: impl Into<String>) -> Self {
        self.reasoning_effort = Some(effort.into());
        self
    }

    /// Sets the stop sequence.
    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    /// Returns true if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.expose_secret().as_str())
    }
}

/// OpenAI-compatible API provider implementation.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Converts our request to the wire format.
    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        OpenAIRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|msg| OpenAIMessage {
                    role: msg.role.as_str().to_string(),
                    content: msg.content.clone(),
                })
                .collect(),
            stream: true,
            keep_alive: self.config.keep_alive.clone(),
            reasoning: self
                .config
                .reasoning_effort
                .clone()
                .map(|effort| ReasoningOptions {
                    effort,
                    exclude: true,
                }),
            stop: self.config.stop.clone(),
        }
    }

    /// Sends a streaming request.
    async fn send_streaming_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<Response, AIError> {
        let openai_request = self.to_openai_request(request);

        let mut builder = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .json(&openai_request);

        if let Some(key) = self.config.api_key() {
            builder = builder.bearer_auth(key);
        }
        if let Some(ref site_url) = self.config.site_url {
            builder = builder.header("HTTP-Referer", site_url);
        }
        if let Some(ref site_name) = self.config.site_name {
            builder = builder.header("X-Title", site_name);
        }

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AIError::Timeout {
                    timeout_secs: self.config.connect_timeout.as_secs() as u32,
                }
            } else if e.is_connect() {
                AIError::network(format!("Connection failed: {}", e))
            } else {
                AIError::network(e.to_string())
            }
        })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(AIError::AuthenticationFailed),
            429 => Err(AIError::rate_limited(Self::parse_retry_after(&error_body))),
            400 | 404 | 422 => Err(AIError::InvalidRequest(error_body)),
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses retry-after from error response.
    fn parse_retry_after(error_body: &str) -> u32 {
        // Default to 30 seconds if the message has no "try again in Xs" hint.
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
            if let Some(s) = parsed
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
            {
                if let Some(idx) = s.find("try again in ") {
                    let rest = &s[idx + 13..];
                    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                    if let Ok(secs) = digits.parse::<u32>() {
                        return secs;
                    }
                }
            }
        }
        30
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError> {
        let response = self.send_streaming_request(&request).await?;
        let response = self.handle_response_status(response).await?;

        let stream = response
            .bytes_stream()
            .scan(SseLineDecoder::default(), |decoder, chunk_result| {
                let items = match chunk_result {
                    Ok(bytes) => decoder.push(&bytes),
                    Err(e) => vec![Err(AIError::network(format!("Stream error: {}", e)))],
                };
                futures::future::ready(Some(items))
            })
            .flat_map(stream::iter);

        Ok(Box::pin(stream))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai-compatible", &self.config.base_url)
    }
}

/// Incremental SSE decoder.
///
/// Buffers raw bytes so that lines (and UTF-8 sequences) split across network
/// chunks are only parsed once complete.
#[derive(Debug, Default)]
struct SseLineDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseLineDecoder {
    /// Feeds a network chunk, returning every chunk completed by it.
    fn push(&mut self, bytes: &[u8]) -> Vec<Result<StreamChunk, AIError>> {
        if self.done {
            return Vec::new();
        }
        self.buffer.extend_from_slice(bytes);

        let mut results = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            match parse_sse_line(line) {
                SseLine::Chunk(chunk) => results.push(chunk),
                SseLine::Done => {
                    self.done = true;
                    self.buffer.clear();
                    break;
                }
                SseLine::Skip => {}
            }
        }
        results
    }
}

#[derive(Debug)]
enum SseLine {
    Chunk(Result<StreamChunk, AIError>),
    Done,
    Skip,
}

/// Parses one complete SSE line.
fn parse_sse_line(line: &str) -> SseLine {
    let data = match line.strip_prefix("data:") {
        Some(data) => data.strip_prefix(' ').unwrap_or(data),
        // Blank separators, comments (": keep-alive") and other fields.
        None => return SseLine::Skip,
    };

    if data == "[DONE]" {
        return SseLine::Done;
    }
    if data.trim().is_empty() {
        return SseLine::Skip;
    }

    let chunk = match serde_json::from_str::<StreamResponseChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            return SseLine::Chunk(Err(AIError::parse(format!(
                "Failed to parse SSE chunk: {}",
                e
            ))))
        }
    };

    if let Some(error) = chunk.error {
        return SseLine::Chunk(Err(AIError::unavailable(error.message)));
    }

    let Some(choice) = chunk.choices.into_iter().next() else {
        return SseLine::Skip;
    };
    let content = choice.delta.content.unwrap_or_default();

    match choice.finish_reason {
        Some(reason) => SseLine::Chunk(Ok(StreamChunk::final_chunk(
            content,
            FinishReason::from_wire(&reason),
        ))),
        None if content.is_empty() => SseLine::Skip,
        None => SseLine::Chunk(Ok(StreamChunk::content(content))),
    }
}

// ----- Wire Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<ReasoningOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReasoningOptions {
    effort: String,
    exclude: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct StreamResponseChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamErrorBody>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamErrorBody {
    message: String,
}
