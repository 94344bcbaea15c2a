use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, error::ErrorUnauthorized};
use futures_util::future::{Ready, ready};
use uuid::Uuid;

/// Inserted by the auth middleware when a valid bearer token is presented.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub id: Uuid,
    pub email: String,
}

impl FromRequest for AuthenticatedPrincipal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedPrincipal>() {
            Some(principal) => ready(Ok(principal.clone())),
            None => ready(Err(ErrorUnauthorized("missing authenticated principal"))),
        }
    }
}

/// Like [`AuthenticatedPrincipal`] but for routes that serve anonymous
/// viewers too.
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<AuthenticatedPrincipal>);

impl FromRequest for MaybePrincipal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(MaybePrincipal(
            req.extensions().get::<AuthenticatedPrincipal>().cloned(),
        )))
    }
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<crate::presentation::middleware::RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}
