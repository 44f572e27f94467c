//! Reactivation responder — picks a retention message for a disengaging user.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use super::classifier::AbandonmentReason;

/// Candidate retention messages for `reason`.
pub fn catalog(reason: AbandonmentReason) -> &'static [&'static str] {
    match reason {
        AbandonmentReason::ThinkingItOver => &[
            "Claro, pense com calma! Se ajudar, posso te mandar um resumo dos planos para comparar.",
            "Sem pressa! Só lembrando que a instalação é grátis para quem contrata esta semana.",
            "Tudo bem! Ficou alguma dúvida que eu possa esclarecer para te ajudar a decidir?",
        ],
        AbandonmentReason::TooExpensive => &[
            "Entendo! Temos o plano de 200 Mega por R$ 99,90, que cabe melhor no bolso. Quer conhecer?",
            "Posso verificar um desconto especial para você no primeiro mês. Que tal?",
            "Sei como é! Com o pagamento em débito automático você ganha 10% de desconto todo mês.",
        ],
        AbandonmentReason::NoLongerInterested => &[
            "Que pena! Pode me contar o que faltou? Sua opinião nos ajuda a melhorar.",
            "Tudo bem! Se mudar de ideia, é só mandar um \"oi\" que eu continuo daqui.",
            "Entendido. Antes de ir, quer saber da nossa oferta sem fidelidade?",
        ],
        AbandonmentReason::LaterNotNow => &[
            "Sem problemas! Quando for um bom momento, é só me chamar.",
            "Combinado! Quer que eu guarde sua oferta por 48 horas?",
            "Tranquilo! Estarei por aqui quando você quiser continuar.",
        ],
    }
}

/// Chooses uniformly among the catalog entries for a reason.
///
/// The random source is injectable so tests can pin outputs.
pub struct ReactivationResponder<R = StdRng> {
    rng: Mutex<R>,
}

impl ReactivationResponder<StdRng> {
    /// Responder seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic responder for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for ReactivationResponder<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> ReactivationResponder<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Pick one retention message for `reason`.
    pub fn respond(&self, reason: AbandonmentReason) -> String {
        let candidates = catalog(reason);
        // A poisoned lock still holds a usable RNG.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let index = rng.gen_range(0..candidates.len());
        candidates[index].to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::mock::StepRng;

    use super::*;

    #[test]
    fn every_reason_has_three_candidates() {
        for reason in AbandonmentReason::ALL {
            assert_eq!(catalog(reason).len(), 3, "{reason}");
        }
    }

    #[test]
    fn respond_stays_within_reason_catalog() {
        let responder = ReactivationResponder::new();
        let own: HashSet<&str> = catalog(AbandonmentReason::ThinkingItOver).iter().copied().collect();
        for _ in 0..200 {
            let text = responder.respond(AbandonmentReason::ThinkingItOver);
            assert!(own.contains(text.as_str()), "unexpected message: {text}");
        }
    }

    #[test]
    fn all_candidates_are_reachable() {
        let responder = ReactivationResponder::with_seed(42);
        for reason in AbandonmentReason::ALL {
            let seen: HashSet<String> = (0..200).map(|_| responder.respond(reason)).collect();
            assert_eq!(seen.len(), 3, "not every message reached for {reason}");
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = ReactivationResponder::with_seed(7);
        let b = ReactivationResponder::with_seed(7);
        for reason in AbandonmentReason::ALL {
            assert_eq!(a.respond(reason), b.respond(reason));
        }
    }

    #[test]
    fn injected_rng_pins_output() {
        // A constant-zero source always selects the first candidate.
        let responder = ReactivationResponder::with_rng(StepRng::new(0, 0));
        assert_eq!(
            responder.respond(AbandonmentReason::LaterNotNow),
            catalog(AbandonmentReason::LaterNotNow)[0]
        );
    }
}
