//! Dialogue router — the single entry point for inbound messages.
//!
//! Decision order, first match wins:
//! 1. Empty message → `RouteError::EmptyMessage`.
//! 2. User mid-flow, or message contains a flow trigger → guided flow.
//! 3. Disengagement phrase → reactivation message.
//! 4. Anything else → generative responder.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::RouterConfig;
use crate::error::RouteError;
use crate::flow::{FlowOutcome, GuidedFlow};
use crate::llm::Responder;
use crate::reactivation::{AbandonmentReason, ReactivationResponder, classify};
use crate::session::{FlowStep, SessionStore};

/// Which behavior produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePath {
    /// Guided flow; carries the step the session is on after the message.
    Flow(FlowStep),
    Reactivation(AbandonmentReason),
    Generative,
}

impl std::fmt::Display for RoutePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flow(step) => write!(f, "flow:{step}"),
            Self::Reactivation(reason) => write!(f, "reactivation:{reason}"),
            Self::Generative => write!(f, "generative"),
        }
    }
}

/// A routed reply.
#[derive(Debug, Clone)]
pub struct RouteReply {
    pub text: String,
    pub path: RoutePath,
}

/// Routes messages to the guided flow, reactivation, or the generative responder.
pub struct DialogueRouter {
    config: RouterConfig,
    sessions: Arc<dyn SessionStore>,
    flow: GuidedFlow,
    reactivation: ReactivationResponder,
    responder: Arc<dyn Responder>,
}

impl DialogueRouter {
    pub fn new(
        config: RouterConfig,
        sessions: Arc<dyn SessionStore>,
        responder: Arc<dyn Responder>,
    ) -> Self {
        let flow = GuidedFlow::new(config.flow.clone());
        Self {
            config,
            sessions,
            flow,
            reactivation: ReactivationResponder::new(),
            responder,
        }
    }

    /// Replace the reactivation responder (e.g. with a seeded one).
    pub fn with_reactivation(mut self, reactivation: ReactivationResponder) -> Self {
        self.reactivation = reactivation;
        self
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn responder(&self) -> &Arc<dyn Responder> {
        &self.responder
    }

    /// Default deadline for generative replies.
    pub fn responder_timeout(&self) -> Duration {
        self.config.responder_timeout
    }

    /// Route a message using the configured responder timeout.
    pub async fn route(&self, user_id: &str, message: &str) -> Result<String, RouteError> {
        self.route_with_timeout(user_id, message, self.config.responder_timeout)
            .await
    }

    /// Route a message with a caller-supplied deadline for generative replies.
    pub async fn route_with_timeout(
        &self,
        user_id: &str,
        message: &str,
        timeout: Duration,
    ) -> Result<String, RouteError> {
        self.route_detailed(user_id, message, timeout)
            .await
            .map(|reply| reply.text)
    }

    /// Route a message and report which path handled it.
    pub async fn route_detailed(
        &self,
        user_id: &str,
        message: &str,
        timeout: Duration,
    ) -> Result<RouteReply, RouteError> {
        if message.trim().is_empty() {
            debug!(user_id = %user_id, "Rejecting empty message");
            return Err(RouteError::EmptyMessage);
        }

        if let Some(reply) = self.try_flow(user_id, message).await {
            return Ok(reply);
        }

        if let Some(reason) = classify(message) {
            info!(user_id = %user_id, %reason, "Sending reactivation message");
            return Ok(RouteReply {
                text: self.reactivation.respond(reason),
                path: RoutePath::Reactivation(reason),
            });
        }

        self.generate(user_id, message, timeout).await
    }

    async fn is_mid_flow(&self, user_id: &str) -> bool {
        self.sessions
            .get(user_id)
            .await
            .is_some_and(|s| s.is_mid_flow())
    }

    fn is_flow_trigger(&self, message: &str) -> bool {
        let lowered = message.to_lowercase();
        self.config
            .flow_triggers
            .iter()
            .any(|trigger| lowered.contains(trigger.as_str()))
    }

    /// Run one flow step if the user is mid-flow or triggered it.
    ///
    /// The per-user lock covers the lookup, the step and the save, and is
    /// released before returning. Users who are neither mid-flow nor sending a
    /// trigger never take the lock, so they leave no lock entry behind.
    async fn try_flow(&self, user_id: &str, message: &str) -> Option<RouteReply> {
        let triggered = self.is_flow_trigger(message);
        if !triggered && !self.is_mid_flow(user_id).await {
            return None;
        }

        let _lock = self.sessions.lock_user(user_id).await;

        // Re-check under the lock: the session may have been evicted meanwhile.
        if !triggered && !self.is_mid_flow(user_id).await {
            return None;
        }

        let mut session = self.sessions.get_or_create(user_id).await;
        let reply = self.flow.advance(&mut session, message);
        let step = session.step;
        self.sessions.save(session).await;

        match reply.outcome {
            FlowOutcome::Advanced { from, to } => {
                info!(user_id = %user_id, %from, %to, "Flow advanced");
            }
            FlowOutcome::Reprompt(choice) => {
                debug!(user_id = %user_id, %step, ?choice, "Flow re-prompt");
            }
            FlowOutcome::Finished => {
                debug!(user_id = %user_id, "Message after completed flow");
            }
        }

        Some(RouteReply {
            text: reply.text,
            path: RoutePath::Flow(step),
        })
    }

    async fn generate(
        &self,
        user_id: &str,
        message: &str,
        timeout: Duration,
    ) -> Result<RouteReply, RouteError> {
        debug!(
            user_id = %user_id,
            model = %self.responder.model_name(),
            prompt = %message.chars().take(100).collect::<String>(),
            "Delegating to generative responder"
        );

        let text = match tokio::time::timeout(timeout, self.responder.generate(message)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(user_id = %user_id, "Generative responder failed: {}", e);
                return Err(e.into());
            }
            Err(_) => {
                warn!(user_id = %user_id, ?timeout, "Generative responder timed out");
                return Err(RouteError::ResponderTimeout { timeout });
            }
        };

        Ok(RouteReply {
            text,
            path: RoutePath::Generative,
        })
    }
}
