// 访客接口，无需登录
mod handler;

pub use handler::{create_rsvp, get_rsvp};
