use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full user record as stored. The password field holds an Argon2 PHC
/// string, never plaintext, and never serializes into a response.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    /// Calendar date, stored and surfaced as YYYY-MM-DD
    pub dob: String,
    /// Public URL of the profile image, empty if none
    pub image: String,
    /// Storage reference for the image, used to delete it on replacement
    pub image_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User fields safe to return to clients (no password, no storage ref)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub dob: String,
    pub image: String,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            dob: u.dob.clone(),
            image: u.image.clone(),
        }
    }
}

/// Short identity used when expanding note owners and shared-with lists
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
}

/// Row shape for the all-users listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListing {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub dob: String,
    pub image: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}
