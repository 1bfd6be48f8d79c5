//! Client for a local Ollama model server.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, instrument};

use super::backend::{Generation, GenerationBackend, ModelInfo};
use super::error::{LlmError, check_status};
use crate::core::config::OllamaConfig;

/// Non-streaming client for Ollama's `/generate` and `/tags` endpoints.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    default_model: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

impl OllamaClient {
    pub fn from_config(config: &OllamaConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_model: config.default_model.clone(),
        }
    }
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    #[instrument(skip(self, prompt, options), fields(prompt_len = prompt.len()))]
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &Map<String, Value>,
    ) -> Result<Generation, LlmError> {
        // Caller options go first so model, prompt and stream always win.
        let mut body = options.clone();
        body.insert("model".into(), Value::String(model.to_string()));
        body.insert("prompt".into(), Value::String(prompt.to_string()));
        body.insert("stream".into(), Value::Bool(false));

        let url = format!("{}/generate", self.base_url);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(&body).send().await?;
        let response = check_status(response).await?;

        response
            .json::<Generation>()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let url = format!("{}/tags", self.base_url);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        Ok(tags.models)
    }
}
