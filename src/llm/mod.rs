//! Generative responder integration for Sales Assist.
//!
//! Supports:
//! - **Anthropic**: Direct API access via rig-core
//! - **OpenAI**: Direct API access via rig-core
//!
//! Uses the rig-core crate for HTTP transport and `RigResponder` to bridge a
//! rig `Agent` to our `Responder` trait.

pub mod provider;
mod rig_adapter;

pub use provider::{Responder, UnavailableResponder};
pub use rig_adapter::RigResponder;

use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::ExposeSecret;

use crate::config::DEFAULT_SYSTEM_PROMPT;
use crate::error::{ConfigError, LlmError};

/// Sampling temperature for generative replies.
const TEMPERATURE: f64 = 0.8;

/// Replies are kept short.
const MAX_TOKENS: u64 = 256;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Anthropic,
    OpenAi,
}

impl LlmBackend {
    fn api_key_var(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::OpenAi => "gpt-4o",
        }
    }
}

impl std::str::FromStr for LlmBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            other => Err(format!("expected 'anthropic' or 'openai', got '{other}'")),
        }
    }
}

/// Configuration for creating a responder.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub system_prompt: String,
}

impl LlmConfig {
    /// Read backend, model and API key from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("SALES_ASSIST_LLM_BACKEND") {
            Some(raw) => raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: "SALES_ASSIST_LLM_BACKEND".to_string(),
                message,
            })?,
            None => LlmBackend::Anthropic,
        };

        let key_var = backend.api_key_var();
        let api_key = lookup(key_var)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(key_var.to_string()))?;

        let model = lookup("SALES_ASSIST_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| backend.default_model().to_string());

        let system_prompt = lookup("SALES_ASSIST_SYSTEM_PROMPT")
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        Ok(Self {
            backend,
            api_key: secrecy::SecretString::from(api_key),
            model,
            system_prompt,
        })
    }
}

/// Create a responder from configuration.
///
/// The API key is not checked here; a bad key surfaces on the first request.
///
/// # Panics
///
/// Must be called from within a tokio runtime: rig's agent builder spawns
/// its tool server task.
pub fn create_responder(config: &LlmConfig) -> Result<Arc<dyn Responder>, LlmError> {
    match config.backend {
        LlmBackend::Anthropic => create_anthropic_responder(config),
        LlmBackend::OpenAi => create_openai_responder(config),
    }
}

fn create_anthropic_responder(config: &LlmConfig) -> Result<Arc<dyn Responder>, LlmError> {
    use rig::providers::anthropic;

    let client: rig::client::Client<anthropic::client::AnthropicExt> =
        anthropic::Client::new(config.api_key.expose_secret()).map_err(|e| {
            LlmError::RequestFailed {
                provider: "anthropic".to_string(),
                reason: format!("Failed to create Anthropic client: {}", e),
            }
        })?;

    let agent = client
        .agent(&config.model)
        .preamble(&config.system_prompt)
        .temperature(TEMPERATURE)
        .max_tokens(MAX_TOKENS)
        .build();
    tracing::info!("Using Anthropic (model: {})", config.model);
    Ok(Arc::new(RigResponder::new(agent, "anthropic", &config.model)))
}

fn create_openai_responder(config: &LlmConfig) -> Result<Arc<dyn Responder>, LlmError> {
    use rig::providers::openai;

    let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
        openai::Client::new(config.api_key.expose_secret()).map_err(|e| {
            LlmError::RequestFailed {
                provider: "openai".to_string(),
                reason: format!("Failed to create OpenAI client: {}", e),
            }
        })?;

    let agent = client
        .agent(&config.model)
        .preamble(&config.system_prompt)
        .temperature(TEMPERATURE)
        .max_tokens(MAX_TOKENS)
        .build();
    tracing::info!("Using OpenAI (model: {})", config.model);
    Ok(Arc::new(RigResponder::new(agent, "openai", &config.model)))
}
