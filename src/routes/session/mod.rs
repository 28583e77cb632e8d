mod handler;

pub use handler::{create_session, destroy_session};
