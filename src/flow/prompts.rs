//! Guided flow texts.

use crate::session::Session;

pub const ASK_NAME: &str =
    "Olá! Que bom ter você aqui. Vou te ajudar a contratar seu plano. Para começar, qual é o seu nome?";

pub const ASK_NAME_AGAIN: &str = "Não consegui entender seu nome. Pode me dizer como você se chama?";

pub const ASK_EMAIL_AGAIN: &str = "Preciso de um e-mail para continuar. Qual é o seu e-mail?";

pub const SERVICE_MENU: &str =
    "Qual serviço você deseja contratar?\n1 - Internet\n2 - Internet + TV";

pub const INVALID_SERVICE: &str =
    "Opção inválida. Responda com 1 para Internet ou 2 para Internet + TV.";

pub const PLAN_MENU: &str =
    "Escolha o seu plano:\n1 - 200 Mega por R$ 99,90/mês\n2 - 500 Mega + TV por R$ 169,90/mês";

pub const INVALID_PLAN: &str =
    "Opção inválida. Responda com 1 para o plano de 200 Mega ou 2 para o plano de 500 Mega + TV.";

pub const NOT_CONFIRMED: &str = "Tudo bem! Me diga o que você gostaria de corrigir, ou responda \"sim\" para confirmar.";

pub const NOT_UNDERSTOOD: &str = "Desculpe, não entendi. Pode repetir?";

pub fn ask_email(name: &str) -> String {
    format!("Prazer, {name}! Qual é o seu e-mail?")
}

pub fn plan_menu(session: &Session) -> String {
    format!("Ótimo, {} selecionado.\n{PLAN_MENU}", session.service.label())
}

pub fn summary(session: &Session) -> String {
    format!(
        "Confira seu pedido:\nNome: {}\nE-mail: {}\nServiço: {}\nPlano: {}\nPosso confirmar? (sim/não)",
        session.name,
        session.email,
        session.service.label(),
        session.plan.label(),
    )
}

pub fn confirmation(protocol_code: &str) -> String {
    format!(
        "Pedido confirmado! Seu protocolo é {protocol_code}. Em breve nossa equipe entrará em contato."
    )
}
