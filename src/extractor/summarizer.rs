use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{instrument, warn};

pub const SUMMARY_FALLBACK_CHARS: usize = 150;
const ELLIPSIS: &str = "...";

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("summarizer api key not provided")]
    MissingKey,

    #[error("summarizer request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("summarizer returned http {0}")]
    Status(StatusCode),

    #[error("no text content found in response")]
    Empty,
}

/// Short-summary collaborator. Any error falls back to truncation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}

/// Summarizer backed by the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiSummarizer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiSummarizer {
    pub fn new(api_key: impl Into<String>) -> Result<Self, SummarizeError> {
        Self::with_base_url(api_key, GEMINI_BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, SummarizeError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SummarizeError::MissingKey);
        }

        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: GEMINI_MODEL.to_string(),
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    #[instrument(skip_all, fields(model = %self.model, chars = text.len()))]
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let prompt = format!(
            "Summarize the following news article in 1-2 sentences:\n\n{}",
            text
        );
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateRequest {
                contents: [RequestContent {
                    parts: [RequestPart { text: &prompt }],
                }],
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SummarizeError::Status(response.status()));
        }

        let body: GenerateResponse = response.json().await?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(SummarizeError::Empty)
    }
}

/// First `max_chars` characters followed by an ellipsis, or the whole text
/// when it is short enough.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Summary for a sanitized description. Empty descriptions have no summary.
pub async fn summarize_or_truncate(
    summarizer: Option<&dyn Summarizer>,
    description: &str,
) -> Option<String> {
    if description.is_empty() {
        return None;
    }

    if let Some(summarizer) = summarizer {
        match summarizer.summarize(description).await {
            Ok(summary) if !summary.trim().is_empty() => return Some(summary),
            Ok(_) => warn!("Summarizer returned an empty summary, falling back to truncation"),
            Err(e) => warn!("Error summarizing article: {}. Falling back to truncation.", e),
        }
    }

    Some(truncate(description, SUMMARY_FALLBACK_CHARS))
}
