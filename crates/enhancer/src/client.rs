//! Chat completion client.

use std::time::Duration;

use serde::Deserialize;

use crate::{
    parse_content, EnhanceError, EnhanceResult, Enhancement, TaskDraft, DEFAULT_BASE_URL,
    DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, SYSTEM_PROMPT,
};

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 150;

/// Enhancer configuration.
#[derive(Clone)]
pub struct EnhancerConfig {
    /// API key; `None` disables remote calls.
    pub api_key: Option<String>,
    /// Base URL including the version segment, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for EnhancerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnhancerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl EnhancerConfig {
    /// Sets the API key. Blank keys count as unset.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Turns free text into a [`TaskDraft`], remotely when configured.
#[derive(Debug, Clone)]
pub struct Enhancer {
    config: EnhancerConfig,
    client: reqwest::Client,
}

impl Enhancer {
    pub fn new(config: EnhancerConfig) -> EnhanceResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Returns true if remote calls are enabled.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Enhances `user_input`. Never fails; see [`Enhancement`].
    pub async fn enhance(&self, user_input: &str) -> Enhancement {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Enhancement::Fallback(TaskDraft::fallback(user_input));
        };

        match self.complete(api_key, user_input).await {
            Ok(content) => Enhancement::Enhanced(parse_content(&content, user_input)),
            Err(e) => {
                tracing::warn!(error = %e, model = %self.config.model, "Enhancement failed, using fallback");
                Enhancement::Fallback(TaskDraft::fallback(user_input))
            }
        }
    }

    fn build_body(&self, user_input: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_input },
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        })
    }

    async fn complete(&self, api_key: &str, user_input: &str) -> EnhanceResult<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.build_body(user_input))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnhanceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or(EnhanceError::MissingContent)
    }
}
