use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ClientError;
use crate::model::{
    AuthResponse, Me, Neighbors, Post, PostPage, Profile, ProfilePage, UpdatePost, UpdateProfile,
};
use crate::session::Session;

/// Typed client for the Quill API. Mutating calls take `&mut self`, so a
/// caller cannot start a second submission while one is in flight.
pub struct QuillClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl QuillClient {
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: endpoint.trim_end_matches('/').to_string(),
            session: Session::new(),
        })
    }

    /// Resume with a persisted token; call [`QuillClient::me`] afterwards
    /// to refresh the account snapshot.
    pub fn with_session(endpoint: &str, session: Session) -> Result<Self, ClientError> {
        let mut client = Self::new(endpoint)?;
        client.session = session;
        Ok(client)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }
        req
    }

    // ── Auth ────────────────────────────────────────────────────────────

    pub async fn send_code(&self, email: &str) -> Result<(), ClientError> {
        let resp = self
            .request(Method::POST, "/api/auth/send-code")
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        expect_success(resp).await
    }

    /// Verifies the emailed code, stores the session token, and returns the
    /// fresh account snapshot so the caller can route into onboarding if
    /// needed.
    pub async fn verify_code(&mut self, email: &str, code: &str) -> Result<Me, ClientError> {
        let resp = self
            .request(Method::POST, "/api/auth/verify")
            .json(&serde_json::json!({ "email": email, "code": code }))
            .send()
            .await?;
        let auth: AuthResponse = parse(resp).await?;

        self.session = Session::restore(auth.access_token);
        let me = self.me().await?;
        Ok(me)
    }

    pub fn sign_out(&mut self) {
        self.session.sign_out();
    }

    pub async fn me(&mut self) -> Result<Me, ClientError> {
        let resp = self.request(Method::GET, "/api/me").send().await?;
        let me: Me = parse(resp).await?;
        self.session.set_me(me.clone());
        Ok(me)
    }

    // ── Profiles ────────────────────────────────────────────────────────

    pub async fn create_profile(&mut self, handle: &str, bio: &str) -> Result<Profile, ClientError> {
        let resp = self
            .request(Method::POST, "/api/profile")
            .json(&serde_json::json!({ "handle": handle, "bio": bio }))
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn update_profile(&mut self, update: &UpdateProfile) -> Result<Profile, ClientError> {
        let resp = self
            .request(Method::PUT, "/api/profile")
            .json(update)
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn upload_avatar(
        &mut self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Profile, ClientError> {
        let resp = self
            .request(Method::PUT, "/api/profile/avatar")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn remove_avatar(&mut self) -> Result<(), ClientError> {
        let resp = self
            .request(Method::DELETE, "/api/profile/avatar")
            .send()
            .await?;
        expect_success(resp).await
    }

    pub async fn list_users(&self, page: u32) -> Result<ProfilePage, ClientError> {
        let resp = self
            .request(Method::GET, &format!("/api/users?page={page}"))
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn get_user(&self, handle: &str) -> Result<Profile, ClientError> {
        let resp = self
            .request(Method::GET, &format!("/api/users/{handle}"))
            .send()
            .await?;
        parse(resp).await
    }

    // ── Posts ───────────────────────────────────────────────────────────

    /// `author = None` lists the signed-in account's own blog, drafts
    /// included; a handle lists that author's public posts.
    pub async fn list_posts(
        &self,
        author: Option<&str>,
        page: u32,
    ) -> Result<PostPage, ClientError> {
        let path = match author {
            Some(handle) => format!("/api/posts?author={handle}&page={page}"),
            None => format!("/api/posts?page={page}"),
        };
        let resp = self.request(Method::GET, &path).send().await?;
        parse(resp).await
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, ClientError> {
        let resp = self
            .request(Method::GET, &format!("/api/posts/{id}"))
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn neighbors(&self, id: Uuid) -> Result<Neighbors, ClientError> {
        let resp = self
            .request(Method::GET, &format!("/api/posts/{id}/neighbors"))
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn create_post(
        &mut self,
        title: &str,
        content: &str,
        published: bool,
    ) -> Result<Post, ClientError> {
        let resp = self
            .request(Method::POST, "/api/posts")
            .json(&serde_json::json!({
                "title": title,
                "content": content,
                "published": published,
            }))
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn update_post(&mut self, id: Uuid, update: &UpdatePost) -> Result<Post, ClientError> {
        let resp = self
            .request(Method::PUT, &format!("/api/posts/{id}"))
            .json(update)
            .send()
            .await?;
        parse(resp).await
    }

    /// Irreversible; callers confirm with the user before invoking this.
    pub async fn delete_post(&mut self, id: Uuid) -> Result<(), ClientError> {
        let resp = self
            .request(Method::DELETE, &format!("/api/posts/{id}"))
            .send()
            .await?;
        expect_success(resp).await
    }
}

async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    if resp.status().is_success() {
        Ok(resp.json().await?)
    } else {
        Err(ClientError::from_http_response(resp).await)
    }
}

async fn expect_success(resp: Response) -> Result<(), ClientError> {
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(ClientError::from_http_response(resp).await)
    }
}
