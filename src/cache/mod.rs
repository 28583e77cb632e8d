// 缓存模块
// 进程内 TTL 键值存储，会话撤销依赖它

mod memory;

pub use memory::MemoryCache;

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache keys cannot be blank")]
    InvalidKey,
    #[error("cache backend failure: {0}")]
    Backend(String),
}

/// 会话层使用的缓存接口
///
/// 每个键拥有独立的过期时间。实现必须允许多个请求并发调用。
pub trait CacheStore: Send + Sync {
    /// 读取值，键不存在或已过期时返回 `None`
    fn get(&self, key: &str) -> Option<String>;

    /// 写入或覆盖值，并在 `ttl` 之后移除。空键返回 [`CacheError::InvalidKey`]。
    fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// 删除键，键不存在时同样成功
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    fn exists(&self, key: &str) -> Result<bool, CacheError>;

    fn flush(&self) -> Result<(), CacheError>;
}
