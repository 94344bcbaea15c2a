use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::post::{Post, PostNav};
use crate::domain::profile::{Profile, SocialLinks};
use crate::domain::visibility::can_mutate;

// ======================= AUTH =======================

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(rename = "token_type")]
    pub token_type: String, // "Bearer"
}

#[derive(Debug, Serialize)]
pub struct PrincipalResponse {
    pub id: Uuid,
    pub email: String,
}

/// `profile: null` means the account is still onboarding and the client
/// should steer it to profile creation.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub principal: PrincipalResponse,
    pub profile: Option<ProfileResponse>,
}

// ======================= PROFILES =======================

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub handle: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub handle: Option<String>,
    pub bio: Option<String>,
    pub social_links: Option<SocialLinks>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub handle: String,
    pub bio: String,
    pub social_links: SocialLinks,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            handle: profile.handle,
            bio: profile.bio,
            social_links: profile.social_links,
            avatar_url: profile.avatar.map(|a| a.url),
            created_at: profile.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListProfilesResponse {
    pub profiles: Vec<ProfileResponse>,
    pub page: u32,
    pub page_size: usize,
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}

// ======================= POSTS =======================

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default = "default_published")]
    pub published: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    /// Author handle; when absent the caller's own blog is listed.
    pub author: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
}

#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub handle: String,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: AuthorResponse,
    /// Whether the requesting viewer may edit or delete this post; the UI
    /// shows write affordances only when this is set.
    pub can_edit: bool,
}

impl PostResponse {
    pub fn new(post: Post, author: &Profile, viewer_profile_id: Option<Uuid>) -> Self {
        let can_edit = can_mutate(&post, viewer_profile_id);
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            published: post.published,
            created_at: post.created_at,
            updated_at: post.updated_at,
            author: AuthorResponse {
                id: author.id,
                handle: author.handle.clone(),
            },
            can_edit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListPostsResponse {
    pub posts: Vec<PostResponse>,
    pub page: u32,
    pub page_size: usize,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct NavResponse {
    pub id: Uuid,
    pub title: String,
}

impl From<PostNav> for NavResponse {
    fn from(nav: PostNav) -> Self {
        Self {
            id: nav.id,
            title: nav.title,
        }
    }
}

/// `next` is the newer neighbor, `prev` the older one.
#[derive(Debug, Serialize)]
pub struct NeighborsResponse {
    pub prev: Option<NavResponse>,
    pub next: Option<NavResponse>,
}

// ======================= Utils =======================

fn default_page() -> u32 {
    1
}

fn default_published() -> bool {
    true
}
