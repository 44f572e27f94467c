//! Inbound transports that feed the dialogue router.

pub mod http;

pub use http::{HttpState, SESSION_HEADER, chat_routes, serve};
