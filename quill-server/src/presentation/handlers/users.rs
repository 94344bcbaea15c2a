use actix_web::{HttpResponse, get, web};

use crate::AppProfileService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{ListProfilesResponse, PageQuery, ProfileResponse};

/// Public discovery: every author, newest first.
#[get("/users")]
pub async fn list_users(
    service: web::Data<AppProfileService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = service.list_profiles(query.page).await?;

    Ok(HttpResponse::Ok().json(ListProfilesResponse {
        profiles: page.items.into_iter().map(ProfileResponse::from).collect(),
        page: page.page,
        page_size: page.page_size,
        has_more: page.has_more,
    }))
}

#[get("/users/{handle}")]
pub async fn get_user(
    service: web::Data<AppProfileService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let profile = service.profile_by_handle(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(profile)))
}
