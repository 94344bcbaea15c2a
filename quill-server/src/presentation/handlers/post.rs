use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use tracing::info;
use uuid::Uuid;

use crate::data::post_repository::PostPatch;
use crate::domain::error::DomainError;
use crate::presentation::dto::{
    CreatePostRequest, ListPostsQuery, ListPostsResponse, NeighborsResponse, PostResponse,
    UpdatePostRequest,
};
use crate::presentation::utils::{AuthenticatedPrincipal, MaybePrincipal, request_id};
use crate::{AppIdentityService, AppPostService, AppProfileService};

/// The viewer's profile id, if the request is authenticated and onboarded.
async fn viewer_profile_id(
    identity: &AppIdentityService,
    principal: &MaybePrincipal,
) -> Result<Option<Uuid>, DomainError> {
    match &principal.0 {
        Some(p) => Ok(identity.resolve(p.id).await?.map(|profile| profile.id)),
        None => Ok(None),
    }
}

#[get("/posts")]
pub async fn list_posts(
    principal: MaybePrincipal,
    identity: web::Data<AppIdentityService>,
    profiles: web::Data<AppProfileService>,
    posts: web::Data<AppPostService>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse, DomainError> {
    let viewer = viewer_profile_id(&identity, &principal).await?;

    // No author means "my blog", which needs an onboarded session.
    let author = match &query.author {
        Some(handle) => profiles.profile_by_handle(handle).await?,
        None => {
            let p = principal.0.as_ref().ok_or(DomainError::Unauthorized)?;
            identity.require(p.id).await?
        }
    };

    let page = posts.list_posts(author.id, viewer, query.page).await?;

    Ok(HttpResponse::Ok().json(ListPostsResponse {
        posts: page
            .items
            .into_iter()
            .map(|post| PostResponse::new(post, &author, viewer))
            .collect(),
        page: page.page,
        page_size: page.page_size,
        has_more: page.has_more,
    }))
}

#[get("/posts/{id}")]
pub async fn get_post(
    principal: MaybePrincipal,
    identity: web::Data<AppIdentityService>,
    profiles: web::Data<AppProfileService>,
    posts: web::Data<AppPostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let viewer = viewer_profile_id(&identity, &principal).await?;
    let post = posts.get_post(viewer, path.into_inner()).await?;
    let author = profiles.profile(post.author_id).await?;

    Ok(HttpResponse::Ok().json(PostResponse::new(post, &author, viewer)))
}

#[get("/posts/{id}/neighbors")]
pub async fn neighbors(
    principal: MaybePrincipal,
    identity: web::Data<AppIdentityService>,
    posts: web::Data<AppPostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let viewer = viewer_profile_id(&identity, &principal).await?;
    let neighbors = posts.neighbors(viewer, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(NeighborsResponse {
        prev: neighbors.prev.map(Into::into),
        next: neighbors.next.map(Into::into),
    }))
}

#[post("/posts")]
pub async fn create_post(
    req: HttpRequest,
    principal: AuthenticatedPrincipal,
    identity: web::Data<AppIdentityService>,
    posts: web::Data<AppPostService>,
    payload: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, DomainError> {
    let author = identity.require(principal.id).await?;
    let payload = payload.into_inner();

    let post = posts
        .create_post(author.id, payload.title, payload.content, payload.published)
        .await?;

    info!(
        request_id = %request_id(&req),
        handle = %author.handle,
        post_id = %post.id,
        "post created"
    );

    Ok(HttpResponse::Created().json(PostResponse::new(post, &author, Some(author.id))))
}

#[put("/posts/{id}")]
pub async fn update_post(
    req: HttpRequest,
    principal: AuthenticatedPrincipal,
    identity: web::Data<AppIdentityService>,
    posts: web::Data<AppPostService>,
    payload: web::Json<UpdatePostRequest>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let author = identity.require(principal.id).await?;
    let post_id = path.into_inner();
    let payload = payload.into_inner();

    let post = posts
        .update_post(
            author.id,
            post_id,
            PostPatch {
                title: payload.title,
                content: payload.content,
                published: payload.published,
            },
        )
        .await?;

    info!(
        request_id = %request_id(&req),
        handle = %author.handle,
        post_id = %post.id,
        "post updated"
    );

    Ok(HttpResponse::Ok().json(PostResponse::new(post, &author, Some(author.id))))
}

#[delete("/posts/{id}")]
pub async fn delete_post(
    req: HttpRequest,
    principal: AuthenticatedPrincipal,
    identity: web::Data<AppIdentityService>,
    posts: web::Data<AppPostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let author = identity.require(principal.id).await?;
    let post_id = path.into_inner();

    posts.delete_post(author.id, post_id).await?;

    info!(
        request_id = %request_id(&req),
        handle = %author.handle,
        post_id = %post_id,
        "post deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
