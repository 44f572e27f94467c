//! Guided sales flow — the multi-turn conversation that collects the
//! customer's name, e-mail, service and plan before confirming the order.

pub mod engine;
pub mod prompts;

pub use engine::{FlowOutcome, FlowReply, GuidedFlow, InvalidChoice};
