use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::principal::Principal;

/// An argon2 hash of an outstanding sign-in code, with its deadline.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredCode {
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    async fn create(&self, principal: Principal) -> Result<Principal, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, DomainError>;

    /// Stores a sign-in code hash for an email, superseding any outstanding
    /// one.
    async fn store_code(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;
    async fn find_code(&self, email: &str) -> Result<Option<StoredCode>, DomainError>;
    async fn delete_code(&self, email: &str) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct PostgresPrincipalRepository {
    pool: PgPool,
}

impl PostgresPrincipalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalRepository for PostgresPrincipalRepository {
    async fn create(&self, principal: Principal) -> Result<Principal, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO principals (id, email, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(principal.id)
        .bind(&principal.email)
        .bind(principal.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create principal: {}", e);
            DomainError::Internal(format!("database error: {}", e))
        })?;

        info!(principal_id = %principal.id, email = %principal.email, "principal created");
        Ok(principal)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError> {
        sqlx::query_as::<_, Principal>(
            r#"
            SELECT id, email, created_at
            FROM principals
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to find principal by email {}: {}", email, e);
            DomainError::Internal(format!("database error: {}", e))
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, DomainError> {
        sqlx::query_as::<_, Principal>(
            r#"
            SELECT id, email, created_at
            FROM principals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to find principal by id {}: {}", id, e);
            DomainError::Internal(format!("database error: {}", e))
        })
    }

    async fn store_code(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO auth_codes (email, code_hash, expires_at, created_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (email) DO UPDATE
            SET code_hash = EXCLUDED.code_hash,
                expires_at = EXCLUDED.expires_at,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(email)
        .bind(code_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to store sign-in code for {}: {}", email, e);
            DomainError::Internal(e.to_string())
        })?;

        Ok(())
    }

    async fn find_code(&self, email: &str) -> Result<Option<StoredCode>, DomainError> {
        sqlx::query_as::<_, StoredCode>(
            r#"
            SELECT code_hash, expires_at
            FROM auth_codes
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to load sign-in code for {}: {}", email, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn delete_code(&self, email: &str) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM auth_codes WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(())
    }
}
