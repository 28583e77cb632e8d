// 认证模块
// 令牌签发、会话管理以及管理员登录校验

mod security;
mod session;
mod token;

pub use security::{SecurityProvider, SecurityService};
pub use session::{SessionError, SessionManager};
pub use token::{Claims, TokenError, TokenService, USERNAME_CLAIM};
