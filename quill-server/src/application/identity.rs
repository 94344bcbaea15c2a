use std::sync::Arc;

use uuid::Uuid;

use crate::data::profile_repository::ProfileRepository;
use crate::domain::{error::DomainError, profile::Profile};

/// Maps an authenticated principal to its profile. A principal with no
/// profile is still onboarding; every operation that needs an author
/// identity goes through [`IdentityService::require`].
#[derive(Clone)]
pub struct IdentityService<R: ProfileRepository + 'static> {
    repo: Arc<R>,
}

impl<R> IdentityService<R>
where
    R: ProfileRepository + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn resolve(&self, principal_id: Uuid) -> Result<Option<Profile>, DomainError> {
        self.repo.find_by_principal(principal_id).await
    }

    /// The acting profile, or `Unauthorized` when the principal has not
    /// finished onboarding.
    pub async fn require(&self, principal_id: Uuid) -> Result<Profile, DomainError> {
        self.resolve(principal_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }
}
