//! Serves images written by the local image store under /public/{name}.

use actix_web::{HttpResponse, web};

use crate::config::uploads_dir;
use crate::storage::{image_extension, mime_for_ext};

async fn serve_upload(path: web::Path<String>) -> HttpResponse {
    let filename = path.into_inner();

    // Only image files generated by the store are served
    let ext = match image_extension(&filename) {
        Some(ext) => ext,
        None => {
            return HttpResponse::Forbidden().json(serde_json::json!({
                "message": "Only image files are served from /public/"
            }));
        }
    };

    // Reject path traversal attempts and hidden files
    if filename.contains("..")
        || filename.contains('/')
        || filename.contains('\\')
        || filename.starts_with('.')
    {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid filename"
        }));
    }

    let dir = uploads_dir();
    let file_path = dir.join(&filename);

    // Canonicalize and verify the target stays within the uploads dir
    let canonical_dir = match dir.canonicalize() {
        Ok(p) => p,
        Err(_) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "message": "File not found"
            }));
        }
    };

    let canonical_file = match file_path.canonicalize() {
        Ok(p) => p,
        Err(_) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "message": "File not found"
            }));
        }
    };

    if !canonical_file.starts_with(&canonical_dir) {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "message": "Access denied"
        }));
    }

    match tokio::fs::read(&canonical_file).await {
        Ok(contents) => HttpResponse::Ok()
            .content_type(mime_for_ext(&ext))
            .append_header(("Cache-Control", "public, max-age=300"))
            .body(contents),
        Err(_) => HttpResponse::NotFound().json(serde_json::json!({
            "message": "File not found"
        })),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/public").route("/{filename}", web::get().to(serve_upload)));
}
