use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::data::principal_repository::PrincipalRepository;
use crate::domain::{error::DomainError, principal::Principal};
use crate::infrastructure::mailer::Mailer;
use crate::infrastructure::security::{JwtKeys, generate_code, hash_code, verify_code};

const CODE_TTL_MINUTES: i64 = 10;

/// Magic-code email sign-in. A code is hashed at rest, lives for ten
/// minutes, and is consumed by its first successful verification. Sign-out
/// is client-side token disposal; tokens are stateless.
#[derive(Clone)]
pub struct AuthService<R: PrincipalRepository + 'static> {
    repo: Arc<R>,
    keys: JwtKeys,
    mailer: Arc<dyn Mailer>,
}

impl<R> AuthService<R>
where
    R: PrincipalRepository + 'static,
{
    pub fn new(repo: Arc<R>, keys: JwtKeys, mailer: Arc<dyn Mailer>) -> Self {
        Self { repo, keys, mailer }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn principal(&self, id: Uuid) -> Result<Principal, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }

    #[instrument(skip(self))]
    pub async fn send_code(&self, email: &str) -> Result<(), DomainError> {
        let email = normalize_email(email)?;
        let code = generate_code();
        let hash = hash_code(&code).map_err(|e| DomainError::Internal(e.to_string()))?;
        let expires_at = Utc::now() + Duration::minutes(CODE_TTL_MINUTES);

        self.repo.store_code(&email, &hash, expires_at).await?;
        self.mailer.send_code(&email, &code).await?;

        info!(email = %email, "sign-in code sent");
        Ok(())
    }

    #[instrument(skip(self, code))]
    pub async fn verify_code(
        &self,
        email: &str,
        code: &str,
    ) -> Result<(Principal, String), DomainError> {
        let email = normalize_email(email)?;
        let stored = self
            .repo
            .find_code(&email)
            .await?
            .ok_or(DomainError::Unauthorized)?;

        if stored.expires_at < Utc::now() {
            self.repo.delete_code(&email).await?;
            warn!(email = %email, "expired sign-in code presented");
            return Err(DomainError::Unauthorized);
        }

        let valid = verify_code(code, &stored.code_hash)
            .map_err(|_| DomainError::Unauthorized)?;
        if !valid {
            return Err(DomainError::Unauthorized);
        }

        // single use
        self.repo.delete_code(&email).await?;

        let principal = match self.repo.find_by_email(&email).await? {
            Some(principal) => principal,
            None => self.repo.create(Principal::new(email.clone())).await?,
        };

        let token = self
            .keys
            .generate_token(principal.id)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        info!(principal_id = %principal.id, "signed in");
        Ok((principal, token))
    }
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::Validation("invalid email address".into()));
    }
    Ok(email)
}
