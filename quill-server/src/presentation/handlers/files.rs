use actix_web::{HttpResponse, get, web};

use crate::data::file_store::LocalFileStore;

/// Serves uploaded files (avatars) from local storage. In a hosted setup
/// this sits behind the file store's own CDN instead.
#[get("/files/{path:.*}")]
pub async fn serve_file(store: web::Data<LocalFileStore>, path: web::Path<String>) -> HttpResponse {
    let path = path.into_inner();
    let Ok(target) = store.resolve(&path) else {
        return HttpResponse::NotFound().finish();
    };

    match tokio::fs::read(&target).await {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(content_type_for(&path))
            .body(bytes),
        Err(_) => HttpResponse::NotFound().finish(),
    }
}

fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
