//! User account routes: register, login, profile, update, all.

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::NaiveDate;
use futures_util::StreamExt;

use crate::AppState;
use crate::auth::{self, password};
use crate::db::models::UserUpdate;
use crate::errors::ApiError;
use crate::models::{LoginRequest, PublicUser};
use crate::storage::{StorageError, StoredImage};

const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Text fields plus optional image file collected from a multipart
/// profile form (register and update share the shape; register
/// additionally requires every text field).
#[derive(Debug, Default)]
struct ProfileForm {
    first_name: Option<String>,
    last_name: Option<String>,
    dob: Option<String>,
    email: Option<String>,
    password: Option<String>,
    image: Option<(Vec<u8>, String)>,
}

async fn read_profile_form(mut payload: Multipart) -> Result<ProfileForm, ApiError> {
    let mut form = ProfileForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            ApiError::validation(format!("Failed to process multipart: {}", e))
        })?;
        let field_name = field.name().to_string();

        if field_name == "image" {
            let filename = field
                .content_disposition()
                .get_filename()
                .unwrap_or("upload")
                .to_string();

            let mut data: Vec<u8> = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| {
                    ApiError::validation(format!("Failed to read image data: {}", e))
                })?;
                data.extend_from_slice(&chunk);
                if data.len() > MAX_IMAGE_SIZE {
                    return Err(ApiError::validation("Image exceeds 5MB limit"));
                }
            }

            form.image = Some((data, filename));
            continue;
        }

        let mut value: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                ApiError::validation(format!("Failed to read field data: {}", e))
            })?;
            value.extend_from_slice(&chunk);
            if value.len() > 64 * 1024 {
                return Err(ApiError::validation("Field value too large"));
            }
        }
        let value = String::from_utf8_lossy(&value).to_string();

        match field_name.as_str() {
            "firstName" => form.first_name = Some(value),
            "lastName" => form.last_name = Some(value),
            "dob" => form.dob = Some(value),
            "email" => form.email = Some(value),
            "password" => form.password = Some(value),
            _ => {}
        }
    }

    Ok(form)
}

/// Push an image through the object-storage collaborator
async fn store_image(
    data: &web::Data<AppState>,
    bytes: Vec<u8>,
    filename: &str,
) -> Result<StoredImage, ApiError> {
    data.storage.upload(bytes, filename).await.map_err(|e| match e {
        StorageError::UnsupportedType(name) => {
            ApiError::validation(format!("Unsupported image type: {}", name))
        }
        e => {
            log::error!("Image upload failed: {}", e);
            ApiError::Server
        }
    })
}

fn validate_dob(dob: &str) -> Result<(), ApiError> {
    NaiveDate::parse_from_str(dob, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ApiError::validation("dob must be a valid YYYY-MM-DD date"))
}

async fn register(
    data: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let form = read_profile_form(payload).await?;

    let (first_name, last_name, dob, email, plaintext) = match (
        form.first_name,
        form.last_name,
        form.dob,
        form.email,
        form.password,
    ) {
        (Some(f), Some(l), Some(d), Some(e), Some(p))
            if !f.is_empty() && !l.is_empty() && !d.is_empty() && !e.is_empty() && !p.is_empty() =>
        {
            (f, l, d, e, p)
        }
        _ => return Err(ApiError::validation("All fields are required")),
    };

    validate_dob(&dob)?;

    if data.db.find_user_by_email(&email)?.is_some() {
        return Err(ApiError::Conflict);
    }

    let (image_url, image_ref) = match form.image {
        Some((bytes, filename)) => {
            let stored = store_image(&data, bytes, &filename).await?;
            (stored.url, stored.reference)
        }
        None => (String::new(), String::new()),
    };

    let hashed = password::hash_password(&plaintext)?;

    let user = data
        .db
        .create_user(
            &first_name,
            Some(&last_name),
            &email,
            &hashed,
            &dob,
            &image_url,
            &image_ref,
        )
        .map_err(ApiError::conflict_on_unique)?;

    let token = auth::issue_token(&user.id, &data.config.jwt_key)?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "User registered successfully",
        "token": token,
        "user": PublicUser::from(&user),
    })))
}

async fn login(
    data: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let (email, plaintext) = match (&body.email, &body.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e, p),
        _ => return Err(ApiError::validation("All fields are required")),
    };

    // One generic failure for unknown email and wrong password
    let user = data
        .db
        .find_user_by_email(email)?
        .ok_or(ApiError::InvalidCredentials)?;

    if !password::verify_password(plaintext, &user.password)? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = auth::issue_token(&user.id, &data.config.jwt_key)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Login successful",
        "token": token,
        "user": PublicUser::from(&user),
    })))
}

async fn profile(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let caller = auth::authenticate(&req, &data.config.jwt_key)?;

    let user = data
        .db
        .find_user_by_id(&caller.id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user": PublicUser::from(&user),
    })))
}

/// Update the caller's own profile, scoped by the token subject -- the
/// request never names a target user.
async fn update(
    data: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let caller = auth::authenticate(&req, &data.config.jwt_key)?;
    let form = read_profile_form(payload).await?;

    let existing = data
        .db
        .find_user_by_id(&caller.id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let Some(ref dob) = form.dob {
        validate_dob(dob)?;
    }

    let image = match form.image {
        Some((bytes, filename)) => {
            let stored = store_image(&data, bytes, &filename).await?;
            // Drop the replaced image; a failure here is not fatal
            if !existing.image_ref.is_empty() {
                if let Err(e) = data.storage.delete(&existing.image_ref).await {
                    log::warn!("Failed to delete replaced image {}: {}", existing.image_ref, e);
                }
            }
            Some((stored.url, stored.reference))
        }
        None => None,
    };

    let hashed = match form.password {
        Some(ref p) if !p.is_empty() => Some(password::hash_password(p)?),
        _ => None,
    };

    let update = UserUpdate {
        first_name: form.first_name.filter(|v| !v.is_empty()),
        last_name: form.last_name,
        email: form.email.filter(|v| !v.is_empty()),
        password: hashed,
        dob: form.dob.filter(|v| !v.is_empty()),
        image,
    };

    let user = data
        .db
        .update_user(&caller.id, &update)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Profile updated",
        "user": PublicUser::from(&user),
    })))
}

async fn all_users(data: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    auth::authenticate(&req, &data.config.jwt_key)?;

    let users = data.db.list_users()?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "users": users })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/profile", web::get().to(profile))
            .route("/update", web::put().to(update))
            .route("/all", web::get().to(all_users)),
    );
}
