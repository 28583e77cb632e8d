// 业务服务
// 校验请求并把存储错误转换为业务错误

mod category;
mod invitation;
mod rsvp;

pub use category::CategoryService;
pub use invitation::{InvitationService, has_phone_number};
pub use rsvp::{RsvpService, draft_rsvp};

use crate::database::{
    StorageError, UNIQUE_GREETING, UNIQUE_INVITATION_PRIVATE_ID, UNIQUE_MOBILE_PHONE_NUMBER,
    UNIQUE_TAG,
};

pub const TAG_MIN_LENGTH: usize = 1;
pub const TAG_MAX_LENGTH: usize = 100;
pub const GREETING_MIN_LENGTH: usize = 2;
pub const GREETING_MAX_LENGTH: usize = 100;
pub const MAXIMUM_GUEST_COUNT_MIN: i32 = 1;
pub const MAXIMUM_GUEST_COUNT_MAX: i32 = 10;
pub const NOTE_MAX_LENGTH: usize = 500;
pub const MOBILE_PHONE_NUMBER_MIN_LENGTH: usize = 8;
pub const MOBILE_PHONE_NUMBER_MAX_LENGTH: usize = 20;
pub const DEFAULT_PHONE_EXTENSION: &str = "+65";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("general service error")]
    General,
}

impl ServiceError {
    fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![message.into()])
    }
}

// 唯一约束冲突对调用方而言是校验错误，其余存储错误都视为内部错误
fn unique_violation_message(constraint: &str) -> &'static str {
    match constraint {
        UNIQUE_TAG => "category tag already exists",
        UNIQUE_GREETING => "greeting already exists",
        UNIQUE_MOBILE_PHONE_NUMBER => "mobile phone number already exists",
        UNIQUE_INVITATION_PRIVATE_ID => "rsvp already exists for invitation",
        _ => "record already exists",
    }
}

fn storage_failure(context: &str, err: StorageError) -> ServiceError {
    match err {
        StorageError::UniqueViolation(constraint) => {
            tracing::warn!("{} - unique constraint {} violated", context, constraint);
            ServiceError::validation(unique_violation_message(constraint))
        }
        err => {
            tracing::error!("{} - storage failure: {}", context, err);
            ServiceError::General
        }
    }
}
