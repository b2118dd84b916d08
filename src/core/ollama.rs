//! Shared HTTP plumbing for the Ollama API.
//!
//! Both the embedder and the chat model talk to an Ollama server. This
//! client owns the `reqwest` connection pool, the per-request timeout
//! and the model management calls (`/api/tags`, `/api/pull`).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::error::{KbaseError, Result};

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    host: String,
    pull_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<String>,
}

impl OllamaClient {
    /// Build a client for `host` (e.g. `http://localhost:11434`).
    ///
    /// `request_timeout` bounds every call except model pulls, which use
    /// `pull_timeout`.
    pub fn new(host: &str, request_timeout: Duration, pull_timeout: Duration) -> Result<Self> {
        let host = host.trim().trim_end_matches('/').to_string();
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(KbaseError::ConfigError(format!(
                "Ollama host must start with http:// or https://, got '{host}'"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| KbaseError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            host,
            pull_timeout,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    /// POST a JSON body and decode a JSON reply.
    ///
    /// Non-2xx replies become `ServiceUnavailable` carrying the body.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        decode(resp, path).await
    }

    /// Names of the models present on the server
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let resp = self
            .http
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(|e| {
                KbaseError::ServiceUnavailable(format!(
                    "Cannot reach Ollama at {}: {e}",
                    self.host
                ))
            })?;

        let tags: TagsResponse = decode(resp, "/api/tags").await?;
        Ok(tags
            .models
            .into_iter()
            .flat_map(|m| std::iter::once(m.name).chain(m.model))
            .collect())
    }

    /// Download a model, blocking until the server reports completion
    pub async fn pull_model(&self, model: &str) -> Result<()> {
        tracing::info!("Pulling model '{}' from {} (this may take a while)", model, self.host);

        let resp = self
            .http
            .post(self.url("/api/pull"))
            .timeout(self.pull_timeout)
            .json(&PullRequest {
                model,
                stream: false,
            })
            .send()
            .await?;

        let reply: PullResponse = decode(resp, "/api/pull").await?;
        if let Some(err) = reply.error {
            return Err(KbaseError::ServiceUnavailable(format!(
                "Pull of '{model}' failed: {err}"
            )));
        }

        tracing::info!("Pull of '{}' finished: {}", model, reply.status);
        Ok(())
    }

    /// Make sure `model` is available, pulling it when allowed.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` when the server cannot be reached or the
    /// model is still missing.
    pub async fn ensure_model(&self, model: &str, auto_pull: bool) -> Result<()> {
        let installed = self.list_models().await?;
        if has_model(&installed, model) {
            tracing::debug!("Model '{}' is available", model);
            return Ok(());
        }

        if !auto_pull {
            return Err(KbaseError::ServiceUnavailable(format!(
                "Model '{model}' is not installed on {}. Run `ollama pull {model}`.",
                self.host
            )));
        }

        tracing::warn!("Model '{}' not found locally", model);
        self.pull_model(model).await?;

        if has_model(&self.list_models().await?, model) {
            Ok(())
        } else {
            Err(KbaseError::ServiceUnavailable(format!(
                "Model '{model}' is still missing after pull"
            )))
        }
    }
}

async fn decode<R: DeserializeOwned>(resp: reqwest::Response, path: &str) -> Result<R> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        return Err(KbaseError::ServiceUnavailable(format!(
            "Ollama {path} returned {status}: {body}"
        )));
    }
    Ok(resp.json::<R>().await?)
}

/// `name` matches exactly, or as `name:latest` when no tag was given
pub fn has_model(installed: &[String], name: &str) -> bool {
    installed.iter().any(|m| {
        m == name
            || (!name.contains(':') && m.strip_suffix(":latest") == Some(name))
    })
}
