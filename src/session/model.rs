//! Session model — which step a user is on and what they have told us.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position of a session in the guided flow.
///
/// Progresses linearly: Greeting → AwaitingName → AwaitingEmail →
/// AwaitingServiceChoice → AwaitingPlanChoice → AwaitingConfirmation →
/// Completed. The derived ordering follows that sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    #[default]
    Greeting,
    AwaitingName,
    AwaitingEmail,
    AwaitingServiceChoice,
    AwaitingPlanChoice,
    AwaitingConfirmation,
    Completed,
}

impl FlowStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: FlowStep) -> bool {
        self.next() == Some(target)
    }

    /// Whether this step is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<FlowStep> {
        use FlowStep::*;
        match self {
            Greeting => Some(AwaitingName),
            AwaitingName => Some(AwaitingEmail),
            AwaitingEmail => Some(AwaitingServiceChoice),
            AwaitingServiceChoice => Some(AwaitingPlanChoice),
            AwaitingPlanChoice => Some(AwaitingConfirmation),
            AwaitingConfirmation => Some(Completed),
            Completed => None,
        }
    }
}

impl std::fmt::Display for FlowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Greeting => "greeting",
            Self::AwaitingName => "awaiting_name",
            Self::AwaitingEmail => "awaiting_email",
            Self::AwaitingServiceChoice => "awaiting_service_choice",
            Self::AwaitingPlanChoice => "awaiting_plan_choice",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// Service line chosen by the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    #[default]
    Unset,
    Internet,
    InternetPlusTv,
}

impl Service {
    /// Human-readable label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unset => "não escolhido",
            Self::Internet => "Internet",
            Self::InternetPlusTv => "Internet + TV",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unset => "unset",
            Self::Internet => "internet",
            Self::InternetPlusTv => "internet_plus_tv",
        };
        write!(f, "{s}")
    }
}

/// Plan chosen by the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Plan {
    #[default]
    #[serde(rename = "unset")]
    Unset,
    #[serde(rename = "plan_200mb")]
    Plan200Mb,
    #[serde(rename = "plan_500mb_tv")]
    Plan500MbTv,
}

impl Plan {
    /// Human-readable label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unset => "não escolhido",
            Self::Plan200Mb => "200 Mega por R$ 99,90/mês",
            Self::Plan500MbTv => "500 Mega + TV por R$ 169,90/mês",
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unset => "unset",
            Self::Plan200Mb => "plan_200mb",
            Self::Plan500MbTv => "plan_500mb_tv",
        };
        write!(f, "{s}")
    }
}

/// One user's guided-flow session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub step: FlowStep,
    pub name: String,
    pub email: String,
    pub service: Service,
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// A fresh session at the greeting step.
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            step: FlowStep::Greeting,
            name: String::new(),
            email: String::new(),
            service: Service::Unset,
            plan: Plan::Unset,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the user is part-way through the flow (past the greeting).
    pub fn is_mid_flow(&self) -> bool {
        self.step != FlowStep::Greeting
    }

    /// Move to the next step. Returns an error if already terminal.
    pub fn advance(&mut self) -> Result<FlowStep, String> {
        let next = self
            .step
            .next()
            .ok_or_else(|| format!("Already at terminal step {}", self.step))?;
        self.step = next;
        Ok(next)
    }

    /// Reset collected data and return to the greeting, keeping the key.
    pub fn reset(&mut self) {
        let created_at = self.created_at;
        *self = Self::new(std::mem::take(&mut self.user_id));
        self.created_at = created_at;
    }

    /// Record activity.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STEPS: [FlowStep; 7] = [
        FlowStep::Greeting,
        FlowStep::AwaitingName,
        FlowStep::AwaitingEmail,
        FlowStep::AwaitingServiceChoice,
        FlowStep::AwaitingPlanChoice,
        FlowStep::AwaitingConfirmation,
        FlowStep::Completed,
    ];

    #[test]
    fn valid_transitions() {
        for pair in ALL_STEPS.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} should transition to {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn invalid_transitions() {
        use FlowStep::*;
        // Skip steps
        assert!(!Greeting.can_transition_to(AwaitingEmail));
        assert!(!AwaitingName.can_transition_to(Completed));
        // Go backward
        assert!(!AwaitingPlanChoice.can_transition_to(AwaitingServiceChoice));
        // Terminal
        assert!(!Completed.can_transition_to(Greeting));
        // Self-transition
        assert!(!AwaitingName.can_transition_to(AwaitingName));
    }

    #[test]
    fn ordering_follows_progression() {
        for pair in ALL_STEPS.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert!(FlowStep::Completed.is_terminal());
        assert!(FlowStep::Completed.next().is_none());
    }

    #[test]
    fn display_matches_serde() {
        for step in ALL_STEPS {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{step}\""), json, "Display and serde should match for {step:?}");
        }
        for service in [Service::Unset, Service::Internet, Service::InternetPlusTv] {
            let json = serde_json::to_string(&service).unwrap();
            assert_eq!(format!("\"{service}\""), json);
        }
        for plan in [Plan::Unset, Plan::Plan200Mb, Plan::Plan500MbTv] {
            let json = serde_json::to_string(&plan).unwrap();
            assert_eq!(format!("\"{plan}\""), json);
        }
    }

    #[test]
    fn new_session_defaults() {
        let session = Session::new("user-1");
        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.step, FlowStep::Greeting);
        assert!(session.name.is_empty());
        assert!(session.email.is_empty());
        assert_eq!(session.service, Service::Unset);
        assert_eq!(session.plan, Plan::Unset);
        assert!(!session.is_mid_flow());
    }

    #[test]
    fn advance_stops_at_terminal() {
        let mut session = Session::new("u");
        for expected in &ALL_STEPS[1..] {
            assert_eq!(session.advance().unwrap(), *expected);
        }
        assert!(session.advance().is_err());
        assert_eq!(session.step, FlowStep::Completed);
    }

    #[test]
    fn reset_keeps_key_and_creation_time() {
        let mut session = Session::new("u");
        session.step = FlowStep::Completed;
        session.name = "Maria".into();
        session.service = Service::Internet;
        let created_at = session.created_at;

        session.reset();

        assert_eq!(session.user_id, "u");
        assert_eq!(session.step, FlowStep::Greeting);
        assert!(session.name.is_empty());
        assert_eq!(session.service, Service::Unset);
        assert_eq!(session.created_at, created_at);
    }
}
