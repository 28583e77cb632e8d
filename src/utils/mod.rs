use bcrypt::verify;

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// 闭区间判断
pub fn is_within<T: PartialOrd>(value: T, min: T, max: T) -> bool {
    value >= min && value <= max
}

/// 首字母大写，用于登录响应中的用户名
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
