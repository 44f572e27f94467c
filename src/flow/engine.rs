//! Guided flow engine — advances a session one step per message.

use tracing::debug;

use super::prompts;
use crate::config::{CompletedPolicy, FlowConfig};
use crate::session::{FlowStep, Plan, Service, Session};

/// Which input failed validation on a re-prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidChoice {
    Name,
    Email,
    Service,
    Plan,
    Confirmation,
}

/// What a single flow step did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// The session moved forward.
    Advanced { from: FlowStep, to: FlowStep },
    /// Validation failed; the step is unchanged.
    Reprompt(InvalidChoice),
    /// The session was already completed.
    Finished,
}

/// Text for the user plus what happened.
#[derive(Debug, Clone)]
pub struct FlowReply {
    pub text: String,
    pub outcome: FlowOutcome,
}

impl FlowReply {
    fn reprompt(choice: InvalidChoice, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            outcome: FlowOutcome::Reprompt(choice),
        }
    }
}

/// Two-option menu answer. "1" is checked first, so a message containing
/// both digits selects the first option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    First,
    Second,
}

fn menu_choice(message: &str) -> Option<MenuChoice> {
    if message.contains('1') {
        Some(MenuChoice::First)
    } else if message.contains('2') {
        Some(MenuChoice::Second)
    } else {
        None
    }
}

/// The step-based state machine for the sales conversation.
#[derive(Debug, Clone, Default)]
pub struct GuidedFlow {
    config: FlowConfig,
}

impl GuidedFlow {
    pub fn new(config: FlowConfig) -> Self {
        Self { config }
    }

    pub fn protocol_code(&self) -> &str {
        &self.config.protocol_code
    }

    /// Advance `session` by at most one step based on `message`.
    pub fn advance(&self, session: &mut Session, message: &str) -> FlowReply {
        let from = session.step;
        let input = message.trim();

        let text = match from {
            FlowStep::Greeting => prompts::ASK_NAME.to_string(),
            FlowStep::AwaitingName => {
                if input.is_empty() {
                    return FlowReply::reprompt(InvalidChoice::Name, prompts::ASK_NAME_AGAIN);
                }
                session.name = input.to_string();
                prompts::ask_email(&session.name)
            }
            FlowStep::AwaitingEmail => {
                if input.is_empty() {
                    return FlowReply::reprompt(InvalidChoice::Email, prompts::ASK_EMAIL_AGAIN);
                }
                session.email = input.to_string();
                prompts::SERVICE_MENU.to_string()
            }
            FlowStep::AwaitingServiceChoice => {
                session.service = match menu_choice(input) {
                    Some(MenuChoice::First) => Service::Internet,
                    Some(MenuChoice::Second) => Service::InternetPlusTv,
                    None => {
                        return FlowReply::reprompt(InvalidChoice::Service, prompts::INVALID_SERVICE);
                    }
                };
                prompts::plan_menu(session)
            }
            FlowStep::AwaitingPlanChoice => {
                session.plan = match menu_choice(input) {
                    Some(MenuChoice::First) => Plan::Plan200Mb,
                    Some(MenuChoice::Second) => Plan::Plan500MbTv,
                    None => return FlowReply::reprompt(InvalidChoice::Plan, prompts::INVALID_PLAN),
                };
                prompts::summary(session)
            }
            FlowStep::AwaitingConfirmation => {
                if !input.to_lowercase().contains("sim") {
                    return FlowReply::reprompt(InvalidChoice::Confirmation, prompts::NOT_CONFIRMED);
                }
                prompts::confirmation(self.protocol_code())
            }
            FlowStep::Completed => return self.after_completion(session, message),
        };

        match session.advance() {
            Ok(to) => {
                debug_assert!(from.can_transition_to(to), "{from} cannot move to {to}");
                debug!(user_id = %session.user_id, %from, %to, "Flow step advanced");
                FlowReply {
                    text,
                    outcome: FlowOutcome::Advanced { from, to },
                }
            }
            // Completed is handled above, so every other step has a successor.
            Err(_) => FlowReply {
                text: prompts::NOT_UNDERSTOOD.to_string(),
                outcome: FlowOutcome::Finished,
            },
        }
    }

    fn after_completion(&self, session: &mut Session, message: &str) -> FlowReply {
        match self.config.completed_policy {
            CompletedPolicy::Fallback => FlowReply {
                text: prompts::NOT_UNDERSTOOD.to_string(),
                outcome: FlowOutcome::Finished,
            },
            CompletedPolicy::Restart => {
                debug!(user_id = %session.user_id, "Restarting completed flow");
                session.reset();
                self.advance(session, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(step: FlowStep) -> Session {
        let mut session = Session::new("u");
        session.step = step;
        session
    }

    fn run(flow: &GuidedFlow, session: &mut Session, messages: &[&str]) -> Vec<FlowReply> {
        messages.iter().map(|m| flow.advance(session, m)).collect()
    }

    #[test]
    fn greeting_asks_for_name() {
        let flow = GuidedFlow::default();
        let mut session = Session::new("u");
        let reply = flow.advance(&mut session, "oi");
        assert_eq!(reply.text, prompts::ASK_NAME);
        assert_eq!(
            reply.outcome,
            FlowOutcome::Advanced {
                from: FlowStep::Greeting,
                to: FlowStep::AwaitingName
            }
        );
        assert_eq!(session.step, FlowStep::AwaitingName);
    }

    #[test]
    fn name_is_trimmed_and_echoed() {
        let flow = GuidedFlow::default();
        let mut session = session_at(FlowStep::AwaitingName);
        let reply = flow.advance(&mut session, "  Maria ");
        assert_eq!(session.name, "Maria");
        assert!(reply.text.contains("Maria"));
        assert_eq!(session.step, FlowStep::AwaitingEmail);
    }

    #[test]
    fn blank_name_reprompts() {
        let flow = GuidedFlow::default();
        let mut session = session_at(FlowStep::AwaitingName);
        let reply = flow.advance(&mut session, "   ");
        assert_eq!(reply.outcome, FlowOutcome::Reprompt(InvalidChoice::Name));
        assert_eq!(session.step, FlowStep::AwaitingName);
        assert!(session.name.is_empty());
    }

    #[test]
    fn full_flow_reaches_completed() {
        let flow = GuidedFlow::default();
        let mut session = Session::new("u");
        let replies = run(
            &flow,
            &mut session,
            &["oi", "Maria", "maria@example.com", "1", "2", "sim"],
        );

        assert_eq!(session.step, FlowStep::Completed);
        assert_eq!(session.name, "Maria");
        assert_eq!(session.email, "maria@example.com");
        assert_eq!(session.service, Service::Internet);
        assert_eq!(session.plan, Plan::Plan500MbTv);
        assert!(replies.last().unwrap().text.contains(flow.protocol_code()));
        assert!(
            replies
                .iter()
                .all(|r| matches!(r.outcome, FlowOutcome::Advanced { .. }))
        );
    }

    #[test]
    fn service_two_selects_internet_plus_tv() {
        let flow = GuidedFlow::default();
        let mut session = session_at(FlowStep::AwaitingServiceChoice);
        let reply = flow.advance(&mut session, "quero a opção 2");
        assert_eq!(session.service, Service::InternetPlusTv);
        assert_eq!(session.step, FlowStep::AwaitingPlanChoice);
        assert!(reply.text.contains("Internet + TV"));
    }

    // Tie-break: "1" wins when both digits appear.
    #[test]
    fn service_message_with_both_digits_selects_first() {
        let flow = GuidedFlow::default();
        let mut session = session_at(FlowStep::AwaitingServiceChoice);
        flow.advance(&mut session, "2 ou 1?");
        assert_eq!(session.service, Service::Internet);
    }

    #[test]
    fn plan_message_with_both_digits_selects_first() {
        let flow = GuidedFlow::default();
        let mut session = session_at(FlowStep::AwaitingPlanChoice);
        flow.advance(&mut session, "12");
        assert_eq!(session.plan, Plan::Plan200Mb);
        assert_eq!(session.step, FlowStep::AwaitingConfirmation);
    }

    #[test]
    fn invalid_menu_choices_hold_step() {
        let flow = GuidedFlow::default();

        let mut session = session_at(FlowStep::AwaitingServiceChoice);
        let reply = flow.advance(&mut session, "internet");
        assert_eq!(reply.outcome, FlowOutcome::Reprompt(InvalidChoice::Service));
        assert_eq!(reply.text, prompts::INVALID_SERVICE);
        assert_eq!(session.step, FlowStep::AwaitingServiceChoice);
        assert_eq!(session.service, Service::Unset);

        let mut session = session_at(FlowStep::AwaitingPlanChoice);
        let reply = flow.advance(&mut session, "o mais barato");
        assert_eq!(reply.outcome, FlowOutcome::Reprompt(InvalidChoice::Plan));
        assert_eq!(session.step, FlowStep::AwaitingPlanChoice);
        assert_eq!(session.plan, Plan::Unset);
    }

    #[test]
    fn confirmation_is_case_insensitive() {
        let flow = GuidedFlow::default();
        let mut session = session_at(FlowStep::AwaitingConfirmation);
        let reply = flow.advance(&mut session, "SIM, pode confirmar");
        assert_eq!(session.step, FlowStep::Completed);
        assert!(reply.text.contains(crate::config::DEFAULT_PROTOCOL_CODE));
    }

    #[test]
    fn declining_confirmation_invites_correction() {
        let flow = GuidedFlow::default();
        let mut session = session_at(FlowStep::AwaitingConfirmation);
        let reply = flow.advance(&mut session, "não, espera");
        assert_eq!(reply.text, prompts::NOT_CONFIRMED);
        assert_eq!(session.step, FlowStep::AwaitingConfirmation);
    }

    #[test]
    fn completed_falls_back_by_default() {
        let flow = GuidedFlow::default();
        let mut session = session_at(FlowStep::Completed);
        session.service = Service::Internet;
        let reply = flow.advance(&mut session, "oi de novo");
        assert_eq!(reply.text, prompts::NOT_UNDERSTOOD);
        assert_eq!(reply.outcome, FlowOutcome::Finished);
        assert_eq!(session.step, FlowStep::Completed);
        assert_eq!(session.service, Service::Internet);
    }

    #[test]
    fn completed_restarts_when_configured() {
        let flow = GuidedFlow::new(FlowConfig {
            completed_policy: CompletedPolicy::Restart,
            ..FlowConfig::default()
        });
        let mut session = session_at(FlowStep::Completed);
        session.plan = Plan::Plan200Mb;

        let reply = flow.advance(&mut session, "oi");

        assert_eq!(reply.text, prompts::ASK_NAME);
        assert_eq!(session.step, FlowStep::AwaitingName);
        assert_eq!(session.plan, Plan::Unset);
    }

    #[test]
    fn custom_protocol_code_is_used() {
        let flow = GuidedFlow::new(FlowConfig {
            protocol_code: "PRT-77".into(),
            ..FlowConfig::default()
        });
        let mut session = session_at(FlowStep::AwaitingConfirmation);
        assert!(flow.advance(&mut session, "sim").text.contains("PRT-77"));
    }

    #[test]
    fn step_never_decreases() {
        let flow = GuidedFlow::default();
        let mut session = Session::new("u");
        let inputs = [
            "oi", "Maria", "", "maria@example.com", "talvez", "2", "nenhum", "1", "não", "sim",
            "mais alguma coisa",
        ];
        let mut previous = session.step;
        for input in inputs {
            flow.advance(&mut session, input);
            assert!(session.step >= previous, "step went backwards on {input:?}");
            previous = session.step;
        }
        assert_eq!(session.step, FlowStep::Completed);
        assert_eq!(session.service, Service::InternetPlusTv);
        assert_eq!(session.plan, Plan::Plan200Mb);
    }
}
