//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Protocol code quoted back to the user when an order is confirmed.
pub const DEFAULT_PROTOCOL_CODE: &str = "VND-2024-0001";

/// Preamble given to the generative responder.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Você é um atendente virtual simpático de um provedor \
de internet. Responda em português, de forma curta e direta.";

/// What the guided flow does with messages that arrive after completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletedPolicy {
    /// Reply with the "didn't understand" text and keep the session completed.
    #[default]
    Fallback,
    /// Reset the session and start the flow again from the greeting.
    Restart,
}

impl std::str::FromStr for CompletedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fallback" => Ok(Self::Fallback),
            "restart" => Ok(Self::Restart),
            other => Err(format!("expected 'fallback' or 'restart', got '{other}'")),
        }
    }
}

/// Guided flow configuration.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Protocol code included in the confirmation message.
    pub protocol_code: String,
    /// Behavior once a session has reached `Completed`.
    pub completed_policy: CompletedPolicy,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            protocol_code: DEFAULT_PROTOCOL_CODE.to_string(),
            completed_policy: CompletedPolicy::Fallback,
        }
    }
}

/// Dialogue router configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Substrings (lower-case) that start the guided flow for a new user.
    pub flow_triggers: Vec<String>,
    /// Default deadline for the generative responder.
    pub responder_timeout: Duration,
    pub flow: FlowConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            flow_triggers: vec!["oi".to_string(), "quero contratar".to_string()],
            responder_timeout: Duration::from_secs(30),
            flow: FlowConfig::default(),
        }
    }
}

/// Process-level configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Sessions idle longer than this are evicted. `None` keeps them for the
    /// lifetime of the process.
    pub session_idle_ttl: Option<Duration>,
    pub router: RouterConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            session_idle_ttl: None,
            router: RouterConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build configuration from `SALES_ASSIST_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("SALES_ASSIST_PORT") {
            config.port = parse_value("SALES_ASSIST_PORT", &port)?;
        }

        if let Some(secs) = lookup("SALES_ASSIST_RESPONDER_TIMEOUT_SECS") {
            let secs: u64 = parse_value("SALES_ASSIST_RESPONDER_TIMEOUT_SECS", &secs)?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "SALES_ASSIST_RESPONDER_TIMEOUT_SECS".to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
            config.router.responder_timeout = Duration::from_secs(secs);
        }

        if let Some(secs) = lookup("SALES_ASSIST_SESSION_IDLE_TTL_SECS") {
            let secs: u64 = parse_value("SALES_ASSIST_SESSION_IDLE_TTL_SECS", &secs)?;
            config.session_idle_ttl = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(policy) = lookup("SALES_ASSIST_COMPLETED_POLICY") {
            config.router.flow.completed_policy = parse_value("SALES_ASSIST_COMPLETED_POLICY", &policy)?;
        }

        if let Some(code) = lookup("SALES_ASSIST_PROTOCOL_CODE") {
            let code = code.trim();
            if !code.is_empty() {
                config.router.flow.protocol_code = code.to_string();
            }
        }

        Ok(config)
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
