//! Session lifecycle management
//!
//! Decides, per request, whether it continues an existing session,
//! starts a new one, is served statelessly, or is rejected.

pub mod dispatcher;
pub mod store;

pub use dispatcher::{Classification, DispatchError, LifecycleDispatcher, Rejection};
pub use store::{InMemorySessionStore, Session, SessionStore};

use crate::mcp::transport::SessionIdGenerator;
use std::sync::Arc;

/// Random UUID v4 session id
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn default_id_generator() -> SessionIdGenerator {
    Arc::new(generate_session_id)
}
