use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use tracing::info;

use crate::domain::error::DomainError;
use crate::data::profile_repository::ProfilePatch;
use crate::presentation::dto::{
    CreateProfileRequest, MeResponse, ProfileResponse, UpdateProfileRequest,
};
use crate::presentation::utils::{AuthenticatedPrincipal, request_id};
use crate::{AppIdentityService, AppProfileService};

/// Session probe: who am I, and do I have a profile yet. A `null` profile
/// tells the client to route into onboarding.
#[get("/me")]
pub async fn me(
    principal: AuthenticatedPrincipal,
    identity: web::Data<AppIdentityService>,
) -> Result<HttpResponse, DomainError> {
    let profile = identity.resolve(principal.id).await?;

    Ok(HttpResponse::Ok().json(MeResponse {
        principal: crate::presentation::dto::PrincipalResponse {
            id: principal.id,
            email: principal.email,
        },
        profile: profile.map(ProfileResponse::from),
    }))
}

#[post("/profile")]
pub async fn create_profile(
    req: HttpRequest,
    principal: AuthenticatedPrincipal,
    service: web::Data<AppProfileService>,
    payload: web::Json<CreateProfileRequest>,
) -> Result<HttpResponse, DomainError> {
    let payload = payload.into_inner();
    let profile = service
        .create_profile(principal.id, payload.handle, payload.bio)
        .await?;

    info!(
        request_id = %request_id(&req),
        handle = %profile.handle,
        "profile created"
    );

    Ok(HttpResponse::Created().json(ProfileResponse::from(profile)))
}

#[put("/profile")]
pub async fn update_profile(
    req: HttpRequest,
    principal: AuthenticatedPrincipal,
    identity: web::Data<AppIdentityService>,
    service: web::Data<AppProfileService>,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, DomainError> {
    let acting = identity.require(principal.id).await?;
    let payload = payload.into_inner();

    let profile = service
        .update_profile(
            acting.id,
            ProfilePatch {
                handle: payload.handle,
                bio: payload.bio,
                social_links: payload.social_links,
            },
        )
        .await?;

    info!(
        request_id = %request_id(&req),
        handle = %profile.handle,
        "profile updated"
    );

    Ok(HttpResponse::Ok().json(ProfileResponse::from(profile)))
}

#[put("/profile/avatar")]
pub async fn upload_avatar(
    req: HttpRequest,
    principal: AuthenticatedPrincipal,
    identity: web::Data<AppIdentityService>,
    service: web::Data<AppProfileService>,
    body: web::Bytes,
) -> Result<HttpResponse, DomainError> {
    let acting = identity.require(principal.id).await?;
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| DomainError::Validation("missing content type".into()))?;

    let profile = service
        .replace_avatar(acting.id, &body, content_type)
        .await?;

    info!(
        request_id = %request_id(&req),
        handle = %profile.handle,
        "avatar replaced"
    );

    Ok(HttpResponse::Ok().json(ProfileResponse::from(profile)))
}

#[delete("/profile/avatar")]
pub async fn remove_avatar(
    req: HttpRequest,
    principal: AuthenticatedPrincipal,
    identity: web::Data<AppIdentityService>,
    service: web::Data<AppProfileService>,
) -> Result<HttpResponse, DomainError> {
    let acting = identity.require(principal.id).await?;
    service.remove_avatar(acting.id).await?;

    info!(
        request_id = %request_id(&req),
        handle = %acting.handle,
        "avatar removed"
    );

    Ok(HttpResponse::NoContent().finish())
}
