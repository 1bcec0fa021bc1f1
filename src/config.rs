use std::env;
use std::path::{Path, PathBuf};

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// HS256 secret for signing and verifying bearer tokens. Required.
    pub const JWT_KEY: &str = "JWT_KEY";
    /// Explicit override for the server's own public URL
    /// (e.g. "https://notes.example.com"), used to build image URLs.
    pub const PUBLIC_URL: &str = "NOTES_PUBLIC_URL";
    /// Directory where the local image store writes uploaded files.
    pub const UPLOADS_DIR: &str = "UPLOADS_DIR";
    /// Base URL of a remote image-store service. When set, uploads are
    /// forwarded there instead of written to the local uploads directory.
    pub const IMAGE_STORE_URL: &str = "IMAGE_STORE_URL";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const DATABASE_URL: &str = "./.db/notes.db";
    pub const UPLOADS_DIR: &str = "./uploads";
}

/// Get the server's own public URL (for constructing absolute URLs to
/// uploaded images). Falls back to http://localhost:{PORT} if not set.
pub fn self_url() -> String {
    if let Ok(url) = env::var(env_vars::PUBLIC_URL) {
        return url.trim_end_matches('/').to_string();
    }

    let port = env::var(env_vars::PORT).unwrap_or_else(|_| defaults::PORT.to_string());
    format!("http://localhost:{}", port)
}

/// Get the uploads directory for the local image store
pub fn uploads_dir() -> PathBuf {
    env::var(env_vars::UPLOADS_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(defaults::UPLOADS_DIR))
}

/// Create the uploads and database directories at startup
pub fn initialize_directories(database_url: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(uploads_dir())?;

    if let Some(parent) = Path::new(database_url).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(())
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_key: String,
    pub image_store_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var(env_vars::PORT)
                .unwrap_or_else(|_| defaults::PORT.to_string())
                .parse()
                .expect("PORT must be a valid number"),
            database_url: env::var(env_vars::DATABASE_URL)
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_string()),
            jwt_key: env::var(env_vars::JWT_KEY).expect("JWT_KEY must be set"),
            image_store_url: env::var(env_vars::IMAGE_STORE_URL)
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }
}
