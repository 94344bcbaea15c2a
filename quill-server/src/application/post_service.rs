use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::application::{Page, page_offset};
use crate::data::post_repository::{PostPatch, PostRepository};
use crate::domain::post::{Post, PostNav};
use crate::domain::visibility::{can_mutate, can_view};
use crate::domain::error::DomainError;

pub const PAGE_SIZE: usize = 10;

/// Prev/next within the focal post's author's collection, newest first.
/// `next` is the chronologically newer neighbor, `prev` the older one.
#[derive(Debug, Clone)]
pub struct Neighbors {
    pub prev: Option<PostNav>,
    pub next: Option<PostNav>,
}

#[derive(Clone)]
pub struct PostService<R: PostRepository + 'static> {
    repo: Arc<R>,
}

impl<R> PostService<R>
where
    R: PostRepository + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Visibility-gated read. An unpublished post a viewer does not own is
    /// reported as missing, the same as a post that does not exist.
    pub async fn get_post(
        &self,
        viewer_profile_id: Option<Uuid>,
        id: Uuid,
    ) -> Result<Post, DomainError> {
        let post = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))?;

        if !can_view(&post, viewer_profile_id) {
            return Err(DomainError::PostNotFound(id));
        }
        Ok(post)
    }

    /// The collection view: the author's own page shows every status, any
    /// other viewer gets published posts only. Pages beyond the data come
    /// back empty rather than failing.
    pub async fn list_posts(
        &self,
        author_profile_id: Uuid,
        viewer_profile_id: Option<Uuid>,
        page: u32,
    ) -> Result<Page<Post>, DomainError> {
        let include_drafts = viewer_profile_id == Some(author_profile_id);
        let posts = self
            .repo
            .list_by_author(
                author_profile_id,
                include_drafts,
                PAGE_SIZE,
                page_offset(page, PAGE_SIZE),
            )
            .await?;

        Ok(Page::new(posts, page.max(1), PAGE_SIZE))
    }

    /// Prev/next around a focal post. For anyone but the author the
    /// collection is filtered to published posts *before* the focal index
    /// is computed, so drafts never surface as neighbors.
    pub async fn neighbors(
        &self,
        viewer_profile_id: Option<Uuid>,
        post_id: Uuid,
    ) -> Result<Neighbors, DomainError> {
        let post = self.get_post(viewer_profile_id, post_id).await?;
        let include_drafts = can_mutate(&post, viewer_profile_id);

        let nav = self.repo.list_nav(post.author_id, include_drafts).await?;
        let Some(i) = nav.iter().position(|n| n.id == post_id) else {
            // deleted between the two reads
            return Err(DomainError::PostNotFound(post_id));
        };

        Ok(Neighbors {
            next: (i > 0).then(|| nav[i - 1].clone()),
            prev: nav.get(i + 1).cloned(),
        })
    }

    #[instrument(skip(self, content))]
    pub async fn create_post(
        &self,
        author_profile_id: Uuid,
        title: String,
        content: String,
        published: bool,
    ) -> Result<Post, DomainError> {
        validate_text("title", &title)?;
        validate_text("content", &content)?;

        let post = Post::new(author_profile_id, title, content, published);
        self.repo.create(post).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update_post(
        &self,
        viewer_profile_id: Uuid,
        post_id: Uuid,
        patch: PostPatch,
    ) -> Result<Post, DomainError> {
        if let Some(title) = &patch.title {
            validate_text("title", title)?;
        }
        if let Some(content) = &patch.content {
            validate_text("content", content)?;
        }

        let post = self
            .repo
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;
        if !can_mutate(&post, Some(viewer_profile_id)) {
            return Err(DomainError::Forbidden);
        }

        match self.repo.update(post_id, viewer_profile_id, patch).await {
            Ok(Some(post)) => Ok(post),
            Ok(None) => Err(DomainError::PostNotFound(post_id)),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_post(
        &self,
        viewer_profile_id: Uuid,
        post_id: Uuid,
    ) -> Result<(), DomainError> {
        let post = self
            .repo
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;
        if !can_mutate(&post, Some(viewer_profile_id)) {
            return Err(DomainError::Forbidden);
        }

        self.repo.delete(post_id, viewer_profile_id).await
    }
}

fn validate_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
