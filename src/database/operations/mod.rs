mod category;
mod invitation;
mod rsvp;

pub use category::CategoryOperation;
pub use invitation::InvitationOperation;
pub use rsvp::RsvpOperation;
