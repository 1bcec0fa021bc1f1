//! Note routes: create, list, privacy, public, delete, update, share,
//! shared-with-me, analytics. Ownership checks live in the policy
//! module; every mutating route verifies the caller before touching
//! the store.

use actix_web::{HttpRequest, HttpResponse, web};

use crate::AppState;
use crate::auth;
use crate::errors::ApiError;
use crate::models::{CreateNoteRequest, Note, PrivacyRequest, ShareRequest, UpdateNoteRequest};
use crate::policy;

/// Load a note or report 404
fn load_note(data: &web::Data<AppState>, id: &str) -> Result<Note, ApiError> {
    data.db
        .get_note(id)?
        .ok_or_else(|| ApiError::not_found("Note not found"))
}

async fn create_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateNoteRequest>,
) -> Result<HttpResponse, ApiError> {
    let caller = auth::authenticate(&req, &data.config.jwt_key)?;

    let title = body
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("title and text are required"))?;
    let text = body
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("title and text are required"))?;

    let is_private = body.is_private.unwrap_or(true);

    // The shared-with invariants hold from the moment a note exists
    let shared_with = match body.shared_with {
        Some(ref targets) => policy::normalize_shared_with(&caller.id, targets),
        None => Vec::new(),
    };

    let note = data
        .db
        .create_note(&caller.id, title, text, is_private, &shared_with)?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Note created successfully",
        "note": note,
    })))
}

async fn read_notes(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let caller = auth::authenticate(&req, &data.config.jwt_key)?;

    let notes = data.db.list_notes_by_owner(&caller.id)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "notes": notes })))
}

async fn update_privacy(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<PrivacyRequest>,
) -> Result<HttpResponse, ApiError> {
    let caller = auth::authenticate(&req, &data.config.jwt_key)?;
    let note_id = path.into_inner();

    let note = load_note(&data, &note_id)?;
    if !policy::is_owner(&note, &caller.id) {
        return Err(ApiError::forbidden("Only owner can update this note"));
    }

    data.db.set_note_privacy(&note_id, body.is_private)?;
    let note = load_note(&data, &note_id)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Note privacy updated",
        "note": note,
    })))
}

/// Public notes are readable without any token
async fn public_notes(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let notes = data.db.list_public_notes()?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "notes": notes })))
}

async fn delete_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let caller = auth::authenticate(&req, &data.config.jwt_key)?;
    let note_id = path.into_inner();

    // Scoped by (id, owner) in one lookup: a non-owner gets the same
    // NotFound as a missing note and learns nothing.
    if !data.db.delete_note_owned(&note_id, &caller.id)? {
        return Err(ApiError::not_found("Note not found"));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Note deleted successfully",
    })))
}

async fn update_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateNoteRequest>,
) -> Result<HttpResponse, ApiError> {
    let caller = auth::authenticate(&req, &data.config.jwt_key)?;
    let note_id = path.into_inner();

    let note = load_note(&data, &note_id)?;
    if !policy::is_owner(&note, &caller.id) {
        return Err(ApiError::forbidden("Only owner can update this note"));
    }

    let title = body.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
    data.db
        .update_note_content(&note_id, title, body.text.as_deref())?;
    let note = load_note(&data, &note_id)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Note updated successfully",
        "note": note,
    })))
}

async fn share_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<ShareRequest>,
) -> Result<HttpResponse, ApiError> {
    let caller = auth::authenticate(&req, &data.config.jwt_key)?;
    let note_id = path.into_inner();

    let note = load_note(&data, &note_id)?;
    if !policy::is_owner(&note, &caller.id) {
        return Err(ApiError::forbidden("Only owner can share this note"));
    }

    let shared_with = policy::normalize_shared_with(&caller.id, &body.shared_with);
    data.db.replace_shared_with(&note_id, &shared_with)?;
    let note = load_note(&data, &note_id)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Note shared successfully",
        "note": note,
    })))
}

async fn shared_notes(
    data: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let caller = auth::authenticate(&req, &data.config.jwt_key)?;

    let notes = data.db.list_notes_shared_with(&caller.id)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "notes": notes })))
}

async fn analytics(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let caller = auth::authenticate(&req, &data.config.jwt_key)?;

    let analytics = data.db.note_analytics(&caller.id)?;

    Ok(HttpResponse::Ok().json(analytics))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notes")
            .route("/create", web::post().to(create_note))
            .route("/read", web::get().to(read_notes))
            .route("/privacy/{id}", web::put().to(update_privacy))
            .route("/public", web::get().to(public_notes))
            .route("/delete/{id}", web::delete().to(delete_note))
            .route("/update/{id}", web::put().to(update_note))
            .route("/share/{id}", web::post().to(share_note))
            .route("/shared", web::get().to(shared_notes))
            .route("/analytics", web::get().to(analytics)),
    );
}
