use actix_web::{HttpRequest, HttpResponse, Responder, Scope, post, web};
use serde_json::json;
use tracing::info;

use crate::AppAuthService;
use crate::domain::error::DomainError;
use crate::infrastructure::security::TOKEN_TTL_HOURS;
use crate::presentation::dto::{AuthResponse, SendCodeRequest, VerifyCodeRequest};
use crate::presentation::utils::request_id;

pub fn scope() -> Scope {
    web::scope("/auth").service(send_code).service(verify)
}

#[post("/send-code")]
async fn send_code(
    req: HttpRequest,
    service: web::Data<AppAuthService>,
    payload: web::Json<SendCodeRequest>,
) -> Result<impl Responder, DomainError> {
    service.send_code(&payload.email).await?;

    info!(request_id = %request_id(&req), "sign-in code requested");

    Ok(HttpResponse::Accepted().json(json!({ "status": "sent" })))
}

#[post("/verify")]
async fn verify(
    req: HttpRequest,
    service: web::Data<AppAuthService>,
    payload: web::Json<VerifyCodeRequest>,
) -> Result<impl Responder, DomainError> {
    let (principal, token) = service.verify_code(&payload.email, &payload.code).await?;

    info!(
        request_id = %request_id(&req),
        principal_id = %principal.id,
        "magic code verified"
    );

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        expires_in: TOKEN_TTL_HOURS * 3600,
        token_type: "Bearer".to_string(),
    }))
}
