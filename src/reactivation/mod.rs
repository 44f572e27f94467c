//! Reactivation — detect users who are about to drop out and answer with a
//! retention message instead of a generic reply.

pub mod classifier;
pub mod responder;

pub use classifier::{AbandonmentReason, classify};
pub use responder::{ReactivationResponder, catalog};
