#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use quill_server::application::auth_service::AuthService;
use quill_server::application::identity::IdentityService;
use quill_server::application::post_service::PostService;
use quill_server::application::profile_service::ProfileService;
use quill_server::data::file_store::FileStore;
use quill_server::data::post_repository::{PostPatch, PostRepository};
use quill_server::data::principal_repository::{PrincipalRepository, StoredCode};
use quill_server::data::profile_repository::{ProfilePatch, ProfileRepository};
use quill_server::domain::error::DomainError;
use quill_server::domain::post::{Post, PostNav};
use quill_server::domain::principal::Principal;
use quill_server::domain::profile::{FileRef, Profile};
use quill_server::infrastructure::mailer::Mailer;
use quill_server::infrastructure::security::JwtKeys;

// ── In-memory backends ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryPrincipalRepository {
    principals: Mutex<Vec<Principal>>,
    codes: Mutex<HashMap<String, StoredCode>>,
}

#[async_trait]
impl PrincipalRepository for MemoryPrincipalRepository {
    async fn create(&self, principal: Principal) -> Result<Principal, DomainError> {
        self.principals.lock().unwrap().push(principal.clone());
        Ok(principal)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError> {
        Ok(self
            .principals
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, DomainError> {
        Ok(self
            .principals
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn store_code(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.codes.lock().unwrap().insert(
            email.to_string(),
            StoredCode {
                code_hash: code_hash.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn find_code(&self, email: &str) -> Result<Option<StoredCode>, DomainError> {
        Ok(self.codes.lock().unwrap().get(email).cloned())
    }

    async fn delete_code(&self, email: &str) -> Result<(), DomainError> {
        self.codes.lock().unwrap().remove(email);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryProfileRepository {
    profiles: Mutex<Vec<Profile>>,
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn create(&self, profile: Profile) -> Result<Profile, DomainError> {
        let mut profiles = self.profiles.lock().unwrap();
        if profiles.iter().any(|p| p.handle == profile.handle) {
            return Err(DomainError::HandleTaken(profile.handle));
        }
        if profiles.iter().any(|p| p.principal_id == profile.principal_id) {
            return Err(DomainError::ProfileExists);
        }
        profiles.push(profile.clone());
        Ok(profile)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, DomainError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn find_by_principal(&self, principal_id: Uuid) -> Result<Option<Profile>, DomainError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.principal_id == principal_id)
            .cloned())
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<Profile>, DomainError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.handle == handle)
            .cloned())
    }

    async fn update(&self, id: Uuid, patch: ProfilePatch) -> Result<Option<Profile>, DomainError> {
        let mut profiles = self.profiles.lock().unwrap();
        if let Some(handle) = &patch.handle {
            if profiles.iter().any(|p| p.id != id && &p.handle == handle) {
                return Err(DomainError::HandleTaken(handle.clone()));
            }
        }
        let Some(profile) = profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(handle) = patch.handle {
            profile.handle = handle;
        }
        if let Some(bio) = patch.bio {
            profile.bio = bio;
        }
        if let Some(links) = patch.social_links {
            profile.social_links = links;
        }
        Ok(Some(profile.clone()))
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Profile>, DomainError> {
        let mut profiles = self.profiles.lock().unwrap().clone();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles.into_iter().skip(offset).take(limit).collect())
    }

    async fn link_avatar(
        &self,
        profile_id: Uuid,
        file: &FileRef,
    ) -> Result<Option<FileRef>, DomainError> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == profile_id)
            .ok_or_else(|| DomainError::ProfileNotFound(profile_id.to_string()))?;
        Ok(profile.avatar.replace(file.clone()))
    }

    async fn unlink_avatar(&self, profile_id: Uuid) -> Result<Option<FileRef>, DomainError> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == profile_id)
            .ok_or_else(|| DomainError::ProfileNotFound(profile_id.to_string()))?;
        Ok(profile.avatar.take())
    }
}

#[derive(Default)]
pub struct MemoryPostRepository {
    posts: Mutex<Vec<Post>>,
}

impl MemoryPostRepository {
    pub fn all(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        Ok(self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        author_id: Uuid,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts
            .iter_mut()
            .find(|p| p.id == id && p.author_id == author_id)
        else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(published) = patch.published {
            post.published = published;
        }
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: Uuid, author_id: Uuid) -> Result<(), DomainError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| !(p.id == id && p.author_id == author_id));
        if posts.len() < before {
            return Ok(());
        }
        if posts.iter().any(|p| p.id == id) {
            Err(DomainError::Forbidden)
        } else {
            Err(DomainError::PostNotFound(id))
        }
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        include_drafts: bool,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Post>, DomainError> {
        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.author_id == author_id && (p.published || include_drafts))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts.into_iter().skip(offset).take(limit).collect())
    }

    async fn list_nav(
        &self,
        author_id: Uuid,
        include_drafts: bool,
    ) -> Result<Vec<PostNav>, DomainError> {
        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.author_id == author_id && (p.published || include_drafts))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts.iter().map(PostNav::from).collect())
    }
}

/// File store that remembers uploads and can be told to fail deletions.
#[derive(Default)]
pub struct MemoryFileStore {
    pub stored: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    pub fail_deletes: AtomicBool,
}

impl MemoryFileStore {
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn upload(
        &self,
        path: &str,
        _bytes: &[u8],
        _content_type: &str,
    ) -> Result<FileRef, DomainError> {
        self.stored.lock().unwrap().push(path.to_string());
        Ok(FileRef {
            id: Uuid::new_v4(),
            path: path.to_string(),
            url: format!("https://files.test/{path}"),
        })
    }

    async fn delete(&self, path: &str) -> Result<(), DomainError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("storage unavailable".into()));
        }
        self.deleted.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

/// Captures issued codes instead of sending mail.
#[derive(Default)]
pub struct RecordingMailer {
    pub last_code: Mutex<Option<String>>,
}

impl RecordingMailer {
    pub fn code(&self) -> String {
        self.last_code.lock().unwrap().clone().expect("no code sent")
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_code(&self, _email: &str, code: &str) -> Result<(), DomainError> {
        *self.last_code.lock().unwrap() = Some(code.to_string());
        Ok(())
    }
}

// ── Test harness ────────────────────────────────────────────────────────

pub struct TestBackend {
    pub principals: Arc<MemoryPrincipalRepository>,
    pub profiles: Arc<MemoryProfileRepository>,
    pub posts: Arc<MemoryPostRepository>,
    pub files: Arc<MemoryFileStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self {
            principals: Arc::new(MemoryPrincipalRepository::default()),
            profiles: Arc::new(MemoryProfileRepository::default()),
            posts: Arc::new(MemoryPostRepository::default()),
            files: Arc::new(MemoryFileStore::default()),
            mailer: Arc::new(RecordingMailer::default()),
        }
    }

    pub fn auth_service(&self) -> AuthService<MemoryPrincipalRepository> {
        AuthService::new(
            Arc::clone(&self.principals),
            JwtKeys::new("test-secret".into()),
            Arc::clone(&self.mailer) as Arc<dyn Mailer>,
        )
    }

    pub fn identity_service(&self) -> IdentityService<MemoryProfileRepository> {
        IdentityService::new(Arc::clone(&self.profiles))
    }

    pub fn profile_service(
        &self,
    ) -> ProfileService<MemoryProfileRepository, MemoryPostRepository, MemoryFileStore> {
        ProfileService::new(
            Arc::clone(&self.profiles),
            Arc::clone(&self.posts),
            Arc::clone(&self.files),
        )
    }

    pub fn post_service(&self) -> PostService<MemoryPostRepository> {
        PostService::new(Arc::clone(&self.posts))
    }

    /// Inserts a profile directly, bypassing example-post seeding.
    pub async fn insert_profile(&self, handle: &str) -> Profile {
        self.profiles
            .create(Profile::new(Uuid::new_v4(), handle.into(), String::new()))
            .await
            .unwrap()
    }

    /// Inserts a post aged `age_minutes` into the past so orderings are
    /// deterministic.
    pub async fn insert_post(
        &self,
        author_id: Uuid,
        title: &str,
        published: bool,
        age_minutes: i64,
    ) -> Post {
        let mut post = Post::new(author_id, title.into(), format!("content of {title}"), published);
        post.created_at -= Duration::minutes(age_minutes);
        post.updated_at = post.created_at;
        self.posts.create(post).await.unwrap()
    }
}
