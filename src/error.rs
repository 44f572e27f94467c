//! Error types for Sales Assist.

use std::time::Duration;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Transport-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),
}

/// Generative responder errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} is not configured: {reason}")]
    NotConfigured { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Errors surfaced by the dialogue router to its caller.
///
/// Invalid flow choices are not errors: the flow re-prompts and stays on the
/// same step.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Generative responder unavailable: {reason}")]
    ResponderUnavailable { reason: String },

    #[error("Generative responder timed out after {timeout:?}")]
    ResponderTimeout { timeout: Duration },
}

impl From<LlmError> for RouteError {
    fn from(e: LlmError) -> Self {
        Self::ResponderUnavailable {
            reason: e.to_string(),
        }
    }
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
