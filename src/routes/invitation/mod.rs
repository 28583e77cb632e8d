mod handler;

pub use handler::{
    create_invitation, delete_invitation, list_invitations, send_invitation, update_invitation,
};
