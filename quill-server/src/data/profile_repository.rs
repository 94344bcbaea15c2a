use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::profile::{FileRef, Profile, SocialLinks};

/// Partial profile update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub handle: Option<String>,
    pub bio: Option<String>,
    pub social_links: Option<SocialLinks>,
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, profile: Profile) -> Result<Profile, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, DomainError>;
    async fn find_by_principal(&self, principal_id: Uuid) -> Result<Option<Profile>, DomainError>;
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Profile>, DomainError>;
    async fn update(&self, id: Uuid, patch: ProfilePatch) -> Result<Option<Profile>, DomainError>;
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Profile>, DomainError>;

    /// Links `file` as the profile's avatar and returns the previously
    /// linked file, if any, so the caller can clean its bytes up.
    async fn link_avatar(
        &self,
        profile_id: Uuid,
        file: &FileRef,
    ) -> Result<Option<FileRef>, DomainError>;

    /// Unlinks the avatar and returns it; `None` when there was nothing to
    /// unlink.
    async fn unlink_avatar(&self, profile_id: Uuid) -> Result<Option<FileRef>, DomainError>;
}

const PROFILE_SELECT: &str = r#"
    SELECT p.id, p.principal_id, p.handle, p.bio, p.social_links, p.created_at,
           f.id AS avatar_id, f.path AS avatar_path, f.url AS avatar_url
    FROM profiles p
    LEFT JOIN files f ON f.id = p.avatar_file_id
"#;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    principal_id: Uuid,
    handle: String,
    bio: String,
    social_links: serde_json::Value,
    created_at: DateTime<Utc>,
    avatar_id: Option<Uuid>,
    avatar_path: Option<String>,
    avatar_url: Option<String>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        let avatar = match (row.avatar_id, row.avatar_path, row.avatar_url) {
            (Some(id), Some(path), Some(url)) => Some(FileRef { id, path, url }),
            _ => None,
        };
        Profile {
            id: row.id,
            principal_id: row.principal_id,
            handle: row.handle,
            bio: row.bio,
            social_links: serde_json::from_value(row.social_links).unwrap_or_default(),
            avatar,
            created_at: row.created_at,
        }
    }
}

fn map_profile_constraint(e: sqlx::Error, handle: &str) -> DomainError {
    if let Some(constraint) = e.as_database_error().and_then(|db| db.constraint()) {
        if constraint.contains("profiles_handle") {
            return DomainError::HandleTaken(handle.to_string());
        }
        if constraint.contains("profiles_principal_id") {
            return DomainError::ProfileExists;
        }
    }
    error!("profile write failed: {}", e);
    DomainError::Internal(format!("database error: {}", e))
}

#[derive(Clone)]
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one(&self, id: Uuid) -> Result<Option<Profile>, DomainError> {
        let sql = format!("{PROFILE_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(Profile::from))
            .map_err(|e| {
                error!("db error loading profile {}: {}", id, e);
                DomainError::Internal(e.to_string())
            })
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn create(&self, profile: Profile) -> Result<Profile, DomainError> {
        let links = serde_json::to_value(&profile.social_links)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO profiles (id, principal_id, handle, bio, social_links, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(profile.id)
        .bind(profile.principal_id)
        .bind(&profile.handle)
        .bind(&profile.bio)
        .bind(links)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_profile_constraint(e, &profile.handle))?;

        info!(profile_id = %profile.id, handle = %profile.handle, "profile created");
        Ok(profile)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, DomainError> {
        self.fetch_one(id).await
    }

    async fn find_by_principal(&self, principal_id: Uuid) -> Result<Option<Profile>, DomainError> {
        let sql = format!("{PROFILE_SELECT} WHERE p.principal_id = $1");
        sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(principal_id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(Profile::from))
            .map_err(|e| {
                error!("db error loading profile for principal {}: {}", principal_id, e);
                DomainError::Internal(e.to_string())
            })
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<Profile>, DomainError> {
        let sql = format!("{PROFILE_SELECT} WHERE p.handle = $1");
        sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(Profile::from))
            .map_err(|e| {
                error!("db error loading profile @{}: {}", handle, e);
                DomainError::Internal(e.to_string())
            })
    }

    async fn update(&self, id: Uuid, patch: ProfilePatch) -> Result<Option<Profile>, DomainError> {
        let handle_for_error = patch.handle.clone().unwrap_or_default();
        let links = match &patch.social_links {
            Some(links) => {
                Some(serde_json::to_value(links).map_err(|e| DomainError::Internal(e.to_string()))?)
            }
            None => None,
        };

        let updated = sqlx::query(
            r#"
            UPDATE profiles
            SET
                handle = COALESCE($1, handle),
                bio = COALESCE($2, bio),
                social_links = COALESCE($3, social_links)
            WHERE id = $4
            "#,
        )
        .bind(patch.handle)
        .bind(patch.bio)
        .bind(links)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_profile_constraint(e, &handle_for_error))?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        info!(profile_id = %id, "profile updated");
        self.fetch_one(id).await
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Profile>, DomainError> {
        let sql = format!("{PROFILE_SELECT} ORDER BY p.created_at DESC LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map(|rows| rows.into_iter().map(Profile::from).collect())
            .map_err(|e| {
                error!("db error listing profiles: {}", e);
                DomainError::Internal(e.to_string())
            })
    }

    async fn link_avatar(
        &self,
        profile_id: Uuid,
        file: &FileRef,
    ) -> Result<Option<FileRef>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let old = sqlx::query_as::<_, FileRow>(
            r#"
            SELECT f.id, f.path, f.url
            FROM profiles p
            JOIN files f ON f.id = p.avatar_file_id
            WHERE p.id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?;

        sqlx::query("INSERT INTO files (id, path, url, created_at) VALUES ($1, $2, $3, now())")
            .bind(file.id)
            .bind(&file.path)
            .bind(&file.url)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let updated = sqlx::query("UPDATE profiles SET avatar_file_id = $1 WHERE id = $2")
            .bind(file.id)
            .bind(profile_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if updated.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            return Err(DomainError::ProfileNotFound(profile_id.to_string()));
        }

        if let Some(old) = &old {
            sqlx::query("DELETE FROM files WHERE id = $1")
                .bind(old.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::Internal(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        info!(profile_id = %profile_id, file_id = %file.id, "avatar linked");
        Ok(old.map(FileRef::from))
    }

    async fn unlink_avatar(&self, profile_id: Uuid) -> Result<Option<FileRef>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let old = sqlx::query_as::<_, FileRow>(
            r#"
            SELECT f.id, f.path, f.url
            FROM profiles p
            JOIN files f ON f.id = p.avatar_file_id
            WHERE p.id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?;

        let Some(old) = old else {
            tx.rollback()
                .await
                .map_err(|e| DomainError::Internal(e.to_string()))?;
            return Ok(None);
        };

        sqlx::query("UPDATE profiles SET avatar_file_id = NULL WHERE id = $1")
            .bind(profile_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(old.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        info!(profile_id = %profile_id, "avatar unlinked");
        Ok(Some(FileRef::from(old)))
    }
}

#[derive(sqlx::FromRow)]
struct FileRow {
    id: Uuid,
    path: String,
    url: String,
}

impl From<FileRow> for FileRef {
    fn from(row: FileRow) -> Self {
        FileRef {
            id: row.id,
            path: row.path,
            url: row.url,
        }
    }
}
