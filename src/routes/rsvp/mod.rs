mod handler;

pub use handler::{create_rsvp, delete_rsvp, list_rsvps, update_rsvp};
