mod category;
mod invitation;
mod rsvp;
mod session;

pub use category::{Category, CategoryCreateRequest, CategoryUpdateRequest};
pub use invitation::{
    Invitation, InvitationCreateRequest, InvitationDetails, InvitationSmsRequest,
    InvitationUpdateRequest, RsvpStatus,
};
pub use rsvp::{Rsvp, RsvpCreateRequest, RsvpDetails, RsvpUpdateRequest};
pub use session::{SessionCreateRequest, SessionCreateResponse};
