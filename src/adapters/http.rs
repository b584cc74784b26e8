//! HTTP generator client.
//!
//! Endpoint: POST <endpoint> with `{"model", "prompt", "stream": false}`
//! Response: `{"response": "..."}` (Ollama `/api/generate` shape)
//! Auth: optional Bearer token

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GeneratorOutput, TextGenerator};

/// HTTP generator client
pub struct HttpGenerator {
    endpoint: String,
    model: String,
    token: Option<String>,
    client: reqwest::Client,
}

/// Request body
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u64>,
}

impl HttpGenerator {
    /// Create a new client
    pub fn new(endpoint: String, model: String, token: Option<String>) -> Self {
        Self {
            endpoint,
            model,
            token,
            client: reqwest::Client::new(),
        }
    }

    /// Create from config values, taking the token from the environment
    pub fn from_env(endpoint: String, model: String) -> Self {
        let token = std::env::var("TASKTRACK_GENERATOR_TOKEN").ok();
        Self::new(endpoint, model, token)
    }
}

#[async_trait]
impl TextGenerator for HttpGenerator {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<GeneratorOutput> {
        let payload = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(timeout)
            .header("Content-Type", "application/json")
            .json(&payload);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach generator at {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Generator error ({}): {}", status, text);
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("Failed to decode generator response")?;

        Ok(GeneratorOutput {
            content: body.response,
            tokens_used: body.eval_count,
        })
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.endpoint)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .with_context(|| format!("Failed to reach generator at {}", self.endpoint))?;

        // Generation endpoints often reject GET; any response means the server is up
        tracing::debug!(status = %response.status(), "Generator health check");
        Ok(())
    }
}
