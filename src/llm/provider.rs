//! The `Responder` trait — the narrow seam to the generative model.

use async_trait::async_trait;

use crate::error::LlmError;

/// An open-ended generative responder.
///
/// Constructed once at startup and shared; implementations may be slow and
/// may fail, but never panic.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Model identifier, for logs and health reporting.
    fn model_name(&self) -> &str;

    /// Generate a reply for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Report whether the responder can currently serve requests.
    async fn health_check(&self) -> Result<(), LlmError> {
        Ok(())
    }
}

/// Stand-in used when no generative backend is configured.
///
/// Every call fails with `LlmError::NotConfigured`, so the guided flow and
/// reactivation paths keep working while generative replies report as
/// unavailable.
pub struct UnavailableResponder {
    reason: String,
}

impl UnavailableResponder {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> LlmError {
        LlmError::NotConfigured {
            provider: "none".to_string(),
            reason: self.reason.clone(),
        }
    }
}

#[async_trait]
impl Responder for UnavailableResponder {
    fn model_name(&self) -> &str {
        "unavailable"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(self.error())
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unavailable_responder_always_fails() {
        let responder = UnavailableResponder::new("ANTHROPIC_API_KEY not set");
        let err = responder.generate("olá").await.unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY not set"));
        assert!(responder.health_check().await.is_err());
        assert_eq!(responder.model_name(), "unavailable");
    }
}
