use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub tag: String,
    // 该分类下的邀请数量
    pub total: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCreateRequest {
    pub tag: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryUpdateRequest {
    #[serde(default)]
    pub id: i64,
    pub tag: String,
}
