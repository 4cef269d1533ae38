use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// The external text-generation collaborator. The app is agnostic to model
/// identity and provider; it hands over the trimmed user string and expects a
/// plain text reply.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}

#[derive(Deserialize)]
struct ModelsResponse {
    models: Vec<ModelEntry>,
}

/// Completion client for an Ollama-compatible HTTP endpoint.
#[derive(Clone)]
pub struct HttpCompletionService {
    client: Client,
    base_url: String,
    model: String,
}

impl HttpCompletionService {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("failed to list models: {}", response.status()));
        }

        let models: ModelsResponse = response.json().await?;
        Ok(models.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait]
impl CompletionService for HttpCompletionService {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.base_url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "completion request failed with status {}",
                response.status()
            ));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .context("malformed completion response")?;

        if reply.response.trim().is_empty() {
            return Err(anyhow!("model returned an empty response"));
        }

        Ok(reply.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_deserializes_from_wire_json() {
        let reply: GenerateResponse =
            serde_json::from_str(r#"{"response":"Hi *there*!","done":true}"#)
                .expect("valid payload");
        assert_eq!(reply.response, "Hi *there*!");
    }

    #[test]
    fn models_response_collects_names() {
        let models: ModelsResponse = serde_json::from_str(
            r#"{"models":[{"name":"llama3.2:latest","size":1},{"name":"gemma3:latest"}]}"#,
        )
        .expect("valid payload");
        let names: Vec<String> = models.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["llama3.2:latest", "gemma3:latest"]);
    }

    #[test]
    fn base_url_is_normalized() {
        let svc = HttpCompletionService::new(
            "http://localhost:11434/",
            "llama3.2:latest",
            Duration::from_secs(5),
        )
        .expect("client builds");
        assert_eq!(svc.base_url, "http://localhost:11434");
        assert_eq!(svc.model, "llama3.2:latest");
    }
}
