//! Disengagement classifier — keyword matching for "I'm leaving" signals.
//!
//! Runs before the generative responder to short-circuit users who are about
//! to drop out of the conversation.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Why the user appears to be disengaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonmentReason {
    ThinkingItOver,
    TooExpensive,
    NoLongerInterested,
    LaterNotNow,
}

impl AbandonmentReason {
    /// All reasons, in matching priority order.
    pub const ALL: [AbandonmentReason; 4] = [
        Self::ThinkingItOver,
        Self::TooExpensive,
        Self::NoLongerInterested,
        Self::LaterNotNow,
    ];

    /// Lower-case trigger phrases for this reason.
    pub fn phrases(&self) -> &'static [&'static str] {
        match self {
            Self::ThinkingItOver => &["vou pensar", "preciso pensar", "pensar melhor", "vou ver"],
            Self::TooExpensive => &["caro", "sem dinheiro", "preço alto", "não tenho dinheiro"],
            Self::NoLongerInterested => {
                &["não quero", "sem interesse", "não tenho interesse", "desisti"]
            }
            Self::LaterNotNow => &["depois", "mais tarde", "agora não", "outro dia"],
        }
    }
}

impl std::fmt::Display for AbandonmentReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ThinkingItOver => "thinking_it_over",
            Self::TooExpensive => "too_expensive",
            Self::NoLongerInterested => "no_longer_interested",
            Self::LaterNotNow => "later_not_now",
        };
        write!(f, "{s}")
    }
}

/// Classify `text` into an abandonment reason, if any phrase matches.
///
/// When phrases from several reasons match, the earliest reason in
/// [`AbandonmentReason::ALL`] wins.
pub fn classify(text: &str) -> Option<AbandonmentReason> {
    let lowered = text.to_lowercase();
    let reason = AbandonmentReason::ALL
        .into_iter()
        .find(|reason| reason.phrases().iter().any(|p| lowered.contains(p)));
    if let Some(reason) = reason {
        debug!(%reason, "Disengagement phrase matched");
    }
    reason
}
