//! Sales Assist — guided sales flow, reactivation and generative fallback
//! behind a single dialogue router.

pub mod channels;
pub mod config;
pub mod error;
pub mod flow;
pub mod llm;
pub mod reactivation;
pub mod router;
pub mod session;

pub use router::{DialogueRouter, RoutePath, RouteReply};
