use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SocialLinks = BTreeMap<String, String>;

#[derive(Debug, Clone, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub handle: String,
    pub bio: String,
    #[serde(default)]
    pub social_links: SocialLinks,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// `profile == None` means the signed-in account has not created its
/// profile yet.
#[derive(Debug, Clone, Deserialize)]
pub struct Me {
    pub principal: Principal,
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub handle: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: Author,
    /// Server-computed: whether this viewer may edit or delete. Write
    /// affordances render only when set.
    pub can_edit: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub page: u32,
    pub page_size: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfilePage {
    pub profiles: Vec<Profile>,
    pub page: u32,
    pub page_size: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavEntry {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Neighbors {
    pub prev: Option<NavEntry>,
    pub next: Option<NavEntry>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdatePost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}
