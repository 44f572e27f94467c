//! Bridges a rig-core `Agent` to our `Responder` trait.

use async_trait::async_trait;
use rig::agent::Agent;
use rig::completion::{CompletionModel, Prompt};

use crate::error::LlmError;
use crate::llm::Responder;

/// A rig-core agent exposed as a `Responder`.
pub struct RigResponder<M: CompletionModel> {
    agent: Agent<M>,
    provider: String,
    model: String,
}

impl<M: CompletionModel> RigResponder<M> {
    pub fn new(agent: Agent<M>, provider: &str, model: &str) -> Self {
        Self {
            agent,
            provider: provider.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl<M> Responder for RigResponder<M>
where
    M: CompletionModel + 'static,
{
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let answer = self
            .agent
            .prompt(prompt.to_string())
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: self.provider.clone(),
                reason: e.to_string(),
            })?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.provider.clone(),
                reason: "empty completion".to_string(),
            });
        }
        Ok(answer.to_string())
    }
}
