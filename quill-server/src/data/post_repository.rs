use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostNav};

/// Partial post update; `None` fields are left unchanged. `updated_at` is
/// always refreshed on a successful update.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: Post) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    async fn update(
        &self,
        id: Uuid,
        author_id: Uuid,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    async fn delete(&self, id: Uuid, author_id: Uuid) -> Result<(), DomainError>;
    async fn list_by_author(
        &self,
        author_id: Uuid,
        include_drafts: bool,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Post>, DomainError>;

    /// The author's whole collection, newest first, trimmed to what
    /// navigation needs.
    async fn list_nav(
        &self,
        author_id: Uuid,
        include_drafts: bool,
    ) -> Result<Vec<PostNav>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, title, content, published, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.published)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            DomainError::Internal(format!("database error: {}", e))
        })?;

        info!(post_id = %post.id, author_id = %post.author_id, published = post.published, "post created");
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, content, published, created_at, updated_at
            FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_by_id {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn update(
        &self,
        id: Uuid,
        author_id: Uuid,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let now = Utc::now();
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET
                title = COALESCE($1, title),
                content = COALESCE($2, content),
                published = COALESCE($3, published),
                updated_at = $4
            WHERE id = $5 AND author_id = $6
            RETURNING id, author_id, title, content, published, created_at, updated_at
            "#,
        )
        .bind(patch.title)
        .bind(patch.content)
        .bind(patch.published)
        .bind(now)
        .bind(id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update post {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })?;

        if post.is_some() {
            info!(post_id = %id, "post updated");
        }

        Ok(post)
    }

    async fn delete(&self, id: Uuid, author_id: Uuid) -> Result<(), DomainError> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if deleted.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| DomainError::Internal(e.to_string()))?;

            return if exists {
                Err(DomainError::Forbidden)
            } else {
                Err(DomainError::PostNotFound(id))
            };
        }

        info!(post_id = %id, "post deleted");
        Ok(())
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        include_drafts: bool,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, content, published, created_at, updated_at
            FROM posts
            WHERE author_id = $1 AND (published OR $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(author_id)
        .bind(include_drafts)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while fetching posts: {}", e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn list_nav(
        &self,
        author_id: Uuid,
        include_drafts: bool,
    ) -> Result<Vec<PostNav>, DomainError> {
        sqlx::query_as::<_, PostNav>(
            r#"
            SELECT id, title, created_at
            FROM posts
            WHERE author_id = $1 AND (published OR $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(author_id)
        .bind(include_drafts)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while fetching navigation: {}", e);
            DomainError::Internal(e.to_string())
        })
    }
}
