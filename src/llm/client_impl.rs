use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::client::{GenerationRequest, LlmClient, ModelNotFound};
use crate::util::SecretString;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

/// Turns a non-success reply into an error; 404 becomes [`ModelNotFound`].
async fn reject_status(response: reqwest::Response, api: &str, model: &str) -> anyhow::Error {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        return ModelNotFound {
            model: model.to_string(),
            detail: format!("{} API error {}: {}", api, status, error_text),
        }
        .into();
    }
    anyhow::anyhow!("{} API error {}: {}", api, status, error_text)
}

// ============================================================================
// Gemini Client (Google Generative AI)
// ============================================================================

pub struct GeminiClient {
    api_key: SecretString,
    model: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiModelList {
    #[serde(default)]
    models: Vec<GeminiModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl GeminiModelList {
    /// Short names of the models that accept `generateContent`.
    fn generation_models(self) -> Vec<String> {
        self.models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods.is_empty()
                    || m
                        .supported_generation_methods
                        .iter()
                        .any(|method| method == "generateContent")
            })
            .map(|m| m.name.trim_start_matches("models/").to_string())
            .collect()
    }
}

impl GeminiResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            bail!("Gemini blocked the prompt: {}", reason);
        }
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .context("No content in Gemini response")?
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();
        Ok(text)
    }
}

impl GeminiClient {
    pub fn new(api_key: SecretString, model: String, timeout_secs: u64) -> Result<Self> {
        Self::with_base_url(api_key, model, GEMINI_BASE_URL.to_string(), timeout_secs)
    }

    pub fn with_base_url(
        api_key: SecretString,
        model: String,
        base_url: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: &GenerationRequest) -> Result<String> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.params.temperature,
                top_p: request.params.top_p,
                max_output_tokens: request.params.max_output_tokens,
            },
        };

        let model = request.model.as_deref().unwrap_or(&self.model);
        debug!("Calling Gemini API with model: {}", model);

        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        if !response.status().is_success() {
            return Err(reject_status(response, "Gemini", model).await);
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        api_response.into_text()
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .send()
            .await
            .context("Failed to list Gemini models")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("Gemini API error {}: {}", status, error_text);
        }

        let list: GeminiModelList = response
            .json()
            .await
            .context("Failed to parse Gemini model list")?;
        Ok(list.generation_models())
    }
}

// ============================================================================
// OpenAI-compatible Client
// ============================================================================

pub struct OpenAIClient {
    api_key: SecretString,
    model: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIModelList {
    #[serde(default)]
    data: Vec<OpenAIModel>,
}

#[derive(Debug, Deserialize)]
struct OpenAIModel {
    id: String,
}

impl OpenAIClient {
    pub fn with_base_url(
        api_key: SecretString,
        model: String,
        base_url: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: &GenerationRequest) -> Result<String> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let body = OpenAIRequest {
            model: model.to_string(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: Some(request.prompt.clone()),
            }],
            temperature: request.params.temperature,
            top_p: request.params.top_p,
            max_tokens: request.params.max_output_tokens,
        };

        debug!(
            "Calling OpenAI-compatible API at {} with model: {}",
            self.base_url, model
        );

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {}", self.api_key.expose()))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to OpenAI-compatible API")?;

        if !response.status().is_success() {
            return Err(reject_status(response, "OpenAI-compatible", model).await);
        }

        let api_response: OpenAIResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI-compatible API response")?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("No choices in OpenAI-compatible response")
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {}", self.api_key.expose()))
            .send()
            .await
            .context("Failed to list OpenAI-compatible models")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("OpenAI-compatible API error {}: {}", status, error_text);
        }

        let list: OpenAIModelList = response
            .json()
            .await
            .context("Failed to parse OpenAI-compatible model list")?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_request_structure() {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: "test".to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.5,
                top_p: 0.85,
                max_output_tokens: 1000,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "test");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1000);
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
        assert!(json["generationConfig"].get("topP").is_some());
    }

    #[test]
    fn test_gemini_response_joins_parts() {
        let json = serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "## Week 1\n"}, {"text": "Sprints"}]}}
            ]
        });
        let response: GeminiResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.into_text().unwrap(), "## Week 1\nSprints");
    }

    #[test]
    fn test_gemini_response_empty_candidates() {
        let response: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let err = response.into_text().unwrap_err();
        assert!(err.to_string().contains("No content"));
    }

    #[test]
    fn test_gemini_response_blocked() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        let err = response.into_text().unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_gemini_model_list_keeps_generation_models() {
        let json = serde_json::json!({
            "models": [
                {"name": "models/gemini-1.5-flash", "supportedGenerationMethods": ["generateContent", "countTokens"]},
                {"name": "models/text-embedding-004", "supportedGenerationMethods": ["embedContent"]},
                {"name": "models/gemini-pro"}
            ]
        });
        let list: GeminiModelList = serde_json::from_value(json).unwrap();
        assert_eq!(
            list.generation_models(),
            vec!["gemini-1.5-flash".to_string(), "gemini-pro".to_string()]
        );
    }

    #[test]
    fn test_openai_request_structure() {
        let request = OpenAIRequest {
            model: "llama3".to_string(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: Some("test".to_string()),
            }],
            temperature: 0.4,
            top_p: 0.8,
            max_tokens: 2000,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3");
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "test");
    }

    #[test]
    fn test_openai_response_null_content() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: OpenAIResponse = serde_json::from_str(json).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GeminiClient::with_base_url(
            SecretString::new("k"),
            "gemini-pro".to_string(),
            "http://localhost:9999/v1beta/".to_string(),
            30,
        )
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:9999/v1beta");
        assert_eq!(client.api_key.expose(), "k");
    }
}
