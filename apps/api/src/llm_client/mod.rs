/// LLM client: the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All collaborator traffic goes through this module.
///
/// Model names are hardcoded per task to prevent drift.
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
pub mod types;

use types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part};

/// Structured policy analysis. Slow but the most careful reader.
pub const ANALYSIS_MODEL: &str = "gemini-2.5-pro";
/// Free-text copywriting and palette extraction.
pub const TEXT_MODEL: &str = "gemini-2.5-flash";
/// Image generation and editing.
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

const REQUEST_TIMEOUT_SECS: u64 = 180;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    /// The response parsed but broke the agreed contract.
    #[error("Response violated the expected schema: {0}")]
    Schema(String),

    #[error("Collaborator task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl LlmError {
    /// User-facing hints for the failure kind.
    pub fn troubleshooting(&self) -> Vec<String> {
        let tips: &[&str] = match self {
            LlmError::Http(_) => &[
                "Check your internet connection.",
                "The AI service may be temporarily unreachable. Try again in a moment.",
            ],
            LlmError::RateLimited { .. } | LlmError::Api { status: 429, .. } => &[
                "The AI service quota has been exceeded. Wait a minute and retry.",
                "Check the billing and quota settings of the API key.",
            ],
            LlmError::Api {
                status: 401 | 403, ..
            } => &["Verify that GEMINI_API_KEY is valid and has access to the model."],
            LlmError::Api { status: 400, .. } => &[
                "The request was rejected. Make sure images are valid JPEG, PNG or WebP files.",
                "Try smaller images or shorter text.",
            ],
            LlmError::Api { .. } | LlmError::Task(_) => {
                &["The AI service returned an error. Try again later."]
            }
            LlmError::Parse(_) | LlmError::Schema(_) | LlmError::EmptyContent => &[
                "The AI returned an unexpected response. Submitting again usually helps.",
                "Simplify the content or use fewer images.",
            ],
        };
        tips.iter().map(|t| t.to_string()).collect()
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The single Gemini client used by the collaborator.
/// Wraps `generateContent` with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Makes a raw `generateContent` call, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Gemini call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(request)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: GenerateContentResponse = response.json().await?;

            let finish_reason = parsed
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("none");
            let usage = parsed.usage_metadata.as_ref();
            debug!(
                model,
                finish_reason,
                "Gemini call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.map_or(0, |u| u.prompt_token_count),
                usage.map_or(0, |u| u.candidates_token_count)
            );

            return Ok(parsed);
        }

        match last_error {
            Some(LlmError::Api { status: 429, .. }) | None => Err(LlmError::RateLimited {
                retries: MAX_RETRIES,
            }),
            Some(e) => Err(e),
        }
    }

    /// Calls the model with a response schema and deserializes the JSON answer.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        model: &str,
        parts: Vec<Part>,
        schema: Value,
        temperature: f32,
    ) -> Result<T, LlmError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(parts)],
            generation_config: Some(GenerationConfig {
                temperature: Some(temperature),
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
                ..Default::default()
            }),
        };

        let response = self.generate(model, &request).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;

        // Strip markdown code fences if the model wraps JSON in them
        serde_json::from_str(strip_json_fences(&text)).map_err(LlmError::Parse)
    }

    /// Calls the model for plain text and returns it trimmed.
    pub async fn call_text(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(prompt)])],
            generation_config: Some(GenerationConfig {
                temperature: Some(temperature),
                ..Default::default()
            }),
        };

        let response = self.generate(model, &request).await?;
        response
            .text()
            .map(|t| t.trim().to_string())
            .ok_or(LlmError::EmptyContent)
    }

    /// Calls an image model. `Ok(None)` means the model answered without an image,
    /// which is a valid outcome rather than an error.
    pub async fn call_image(
        &self,
        model: &str,
        parts: Vec<Part>,
    ) -> Result<Option<InlineData>, LlmError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(parts)],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                ..Default::default()
            }),
        };

        let response = self.generate(model, &request).await?;
        Ok(response.first_inline_data().cloned())
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"status\": \"compliant\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"status\": \"compliant\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"status\": \"warning\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"status\": \"warning\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  {\"status\": \"compliant\"}  ";
        assert_eq!(strip_json_fences(input), "{\"status\": \"compliant\"}");
    }

    #[test]
    fn test_quota_errors_mention_quota() {
        let tips = LlmError::Api {
            status: 429,
            message: "RESOURCE_EXHAUSTED".to_string(),
        }
        .troubleshooting();
        assert!(tips.iter().any(|t| t.contains("quota")));
    }

    #[test]
    fn test_auth_errors_point_at_api_key() {
        let tips = LlmError::Api {
            status: 403,
            message: "denied".to_string(),
        }
        .troubleshooting();
        assert!(tips[0].contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = LlmClient::new(
            "key".to_string(),
            "https://example.test/v1beta/".to_string(),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://example.test/v1beta");
    }
}
