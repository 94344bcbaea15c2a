use std::sync::Arc;

use chrono::Duration;
use once_cell::sync::Lazy;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::application::{Page, page_offset};
use crate::data::file_store::FileStore;
use crate::data::post_repository::PostRepository;
use crate::data::profile_repository::{ProfilePatch, ProfileRepository};
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::profile::{Profile, clean_social_links, validate_handle};

pub const PAGE_SIZE: usize = 10;
pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

static IMAGE_TYPES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("image/jpeg", "jpg"),
        ("image/png", "png"),
        ("image/gif", "gif"),
        ("image/webp", "webp"),
    ]
});

#[derive(Clone)]
pub struct ProfileService<R, P, F>
where
    R: ProfileRepository + 'static,
    P: PostRepository + 'static,
    F: FileStore + 'static,
{
    profiles: Arc<R>,
    posts: Arc<P>,
    files: Arc<F>,
}

impl<R, P, F> ProfileService<R, P, F>
where
    R: ProfileRepository + 'static,
    P: PostRepository + 'static,
    F: FileStore + 'static,
{
    pub fn new(profiles: Arc<R>, posts: Arc<P>, files: Arc<F>) -> Self {
        Self {
            profiles,
            posts,
            files,
        }
    }

    pub async fn profile(&self, id: Uuid) -> Result<Profile, DomainError> {
        self.profiles
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::ProfileNotFound(id.to_string()))
    }

    pub async fn profile_by_handle(&self, handle: &str) -> Result<Profile, DomainError> {
        self.profiles
            .find_by_handle(handle)
            .await?
            .ok_or_else(|| DomainError::ProfileNotFound(handle.to_string()))
    }

    /// Public discovery: every profile, newest first.
    pub async fn list_profiles(&self, page: u32) -> Result<Page<Profile>, DomainError> {
        let profiles = self
            .profiles
            .list(PAGE_SIZE, page_offset(page, PAGE_SIZE))
            .await?;
        Ok(Page::new(profiles, page.max(1), PAGE_SIZE))
    }

    #[instrument(skip(self, bio))]
    pub async fn create_profile(
        &self,
        principal_id: Uuid,
        handle: String,
        bio: String,
    ) -> Result<Profile, DomainError> {
        validate_handle(&handle)?;

        let profile = self
            .profiles
            .create(Profile::new(principal_id, handle, bio))
            .await?;

        // Starter content; a seeding failure must not lose the profile.
        if let Err(e) = self.seed_example_posts(profile.id).await {
            warn!(profile_id = %profile.id, "failed to seed example posts: {}", e);
        }

        Ok(profile)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_profile(
        &self,
        profile_id: Uuid,
        mut patch: ProfilePatch,
    ) -> Result<Profile, DomainError> {
        if let Some(handle) = &patch.handle {
            validate_handle(handle)?;
        }
        if let Some(links) = patch.social_links.take() {
            patch.social_links = Some(clean_social_links(links));
        }

        self.profiles
            .update(profile_id, patch)
            .await?
            .ok_or_else(|| DomainError::ProfileNotFound(profile_id.to_string()))
    }

    /// Uploads and links the new avatar first; the old file is removed
    /// afterwards on a best-effort basis, since the user-visible state is
    /// already correct once the new file is linked.
    #[instrument(skip(self, bytes))]
    pub async fn replace_avatar(
        &self,
        profile_id: Uuid,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<Profile, DomainError> {
        let ext = validate_avatar(bytes, content_type)?;

        let path = format!("avatars/{}/{}.{}", profile_id, Uuid::new_v4(), ext);
        let file = self.files.upload(&path, bytes, content_type).await?;

        let old = self.profiles.link_avatar(profile_id, &file).await?;
        if let Some(old) = old {
            if let Err(e) = self.files.delete(&old.path).await {
                warn!(profile_id = %profile_id, path = %old.path, "failed to delete old avatar: {}", e);
            }
        }

        self.profile(profile_id).await
    }

    /// Unlinks and deletes the avatar; does nothing when there is none.
    #[instrument(skip(self))]
    pub async fn remove_avatar(&self, profile_id: Uuid) -> Result<(), DomainError> {
        match self.profiles.unlink_avatar(profile_id).await? {
            Some(old) => self.files.delete(&old.path).await,
            None => Ok(()),
        }
    }

    async fn seed_example_posts(&self, profile_id: Uuid) -> Result<(), DomainError> {
        let welcome = Post::new(
            profile_id,
            "Welcome to My Blog".into(),
            "This is my first blog post! I'm excited to share my thoughts and ideas here.\n\n\
             Feel free to browse around and check out my content."
                .into(),
            true,
        );
        let mut starting = Post::new(
            profile_id,
            "Getting Started with Blogging".into(),
            "Blogging is a great way to express yourself and share your knowledge with the world.\n\n\
             Here are some tips to get started:\n\
             - Choose topics you're passionate about\n\
             - Write regularly\n\
             - Engage with your readers\n\
             - Don't be afraid to show your personality"
                .into(),
            true,
        );
        let mut draft = Post::new(
            profile_id,
            "My First Draft".into(),
            "This is a draft post that only I can see. I'll continue working on it later.".into(),
            false,
        );

        // Stagger timestamps so the welcome post lands on top.
        starting.created_at -= Duration::minutes(30);
        starting.updated_at = starting.created_at;
        draft.created_at -= Duration::hours(1);
        draft.updated_at = draft.created_at;

        for post in [welcome, starting, draft] {
            self.posts.create(post).await?;
        }
        Ok(())
    }
}

/// Checks the upload is a known image type under the size ceiling and
/// returns the file extension to store it under.
fn validate_avatar(bytes: &[u8], content_type: &str) -> Result<&'static str, DomainError> {
    if bytes.is_empty() {
        return Err(DomainError::Validation("avatar file is empty".into()));
    }
    if bytes.len() > MAX_AVATAR_BYTES {
        return Err(DomainError::Validation(
            "avatar must be an image under 2 MB".into(),
        ));
    }
    IMAGE_TYPES
        .iter()
        .find(|(ty, _)| *ty == content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            DomainError::Validation(format!("unsupported avatar content type: {content_type}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_validation_checks_type_and_size() {
        assert_eq!(validate_avatar(&[1, 2, 3], "image/png").unwrap(), "png");
        assert!(validate_avatar(&[], "image/png").is_err());
        assert!(validate_avatar(&[1], "text/html").is_err());
        assert!(validate_avatar(&vec![0u8; MAX_AVATAR_BYTES + 1], "image/jpeg").is_err());
        assert_eq!(
            validate_avatar(&vec![0u8; MAX_AVATAR_BYTES], "image/jpeg").unwrap(),
            "jpg"
        );
    }
}
