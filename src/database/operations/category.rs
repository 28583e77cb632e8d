// 分类存储
// total 由 invitations 表实时统计

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::{CategoryStorage, StorageError};
use crate::models::{Category, CategoryCreateRequest};

pub struct CategoryOperation {
    db: Arc<PgPool>,
}

impl CategoryOperation {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryStorage for CategoryOperation {
    async fn insert_category(&self, req: &CategoryCreateRequest) -> Result<Category, StorageError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (tag)
            VALUES ($1)
            RETURNING id, tag, 0::BIGINT AS total
            "#,
        )
        .bind(&req.tag)
        .fetch_one(&*self.db)
        .await
        .map_err(|e| {
            tracing::warn!("postgres - unable to insert category {}: {}", req.tag, e);
            StorageError::from(e)
        })?;

        Ok(category)
    }

    async fn find_category_by_id(&self, id: i64) -> Result<Category, StorageError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.tag, COUNT(i.id) AS total
            FROM categories c
            LEFT JOIN invitations i ON i.category_id = c.id
            WHERE c.id = $1
            GROUP BY c.id
            "#,
        )
        .bind(id)
        .fetch_one(&*self.db)
        .await?;

        Ok(category)
    }

    async fn find_all_categories(&self) -> Result<Vec<Category>, StorageError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.tag, COUNT(i.id) AS total
            FROM categories c
            LEFT JOIN invitations i ON i.category_id = c.id
            GROUP BY c.id
            ORDER BY c.tag DESC
            "#,
        )
        .fetch_all(&*self.db)
        .await?;

        Ok(categories)
    }

    async fn update_category(&self, category: &Category) -> Result<Category, StorageError> {
        let updated = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET tag = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, tag,
                (SELECT COUNT(*) FROM invitations i WHERE i.category_id = categories.id) AS total
            "#,
        )
        .bind(category.id)
        .bind(&category.tag)
        .fetch_one(&*self.db)
        .await?;

        Ok(updated)
    }

    async fn delete_category_by_id(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
