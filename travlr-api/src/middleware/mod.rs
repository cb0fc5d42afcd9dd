pub mod auth;

pub use auth::{require_session, session_gate, ADMIN_PATHS};
