mod auth;
mod error_handler;

pub use auth::{AUTH_HEADER, AuthToken, session_middleware};
pub use error_handler::log_errors;
