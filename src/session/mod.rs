//! Per-user conversation state for the guided sales flow.

pub mod model;
pub mod store;

pub use model::{FlowStep, Plan, Service, Session};
pub use store::{InMemorySessionStore, SessionStore, UserLock, spawn_eviction_task};
