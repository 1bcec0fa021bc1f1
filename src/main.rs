use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use dotenv::dotenv;
use std::sync::Arc;

mod auth;
mod config;
mod controllers;
mod db;
mod errors;
mod models;
mod policy;
mod storage;

use config::Config;
use db::Database;
use storage::{LocalImageStore, ObjectStorage, RemoteImageStore};

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    /// Object storage for profile images (local disk by default, remote
    /// when IMAGE_STORE_URL is set)
    pub storage: Arc<dyn ObjectStorage>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    log::info!("notes-backend v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    let port = config.port;

    if let Err(e) = config::initialize_directories(&config.database_url) {
        log::error!("Failed to initialize directories: {}", e);
    }

    let db = Arc::new(Database::new(&config.database_url).expect("Failed to initialize database"));
    log::info!("Database ready at {}", config.database_url);

    let storage: Arc<dyn ObjectStorage> = match config.image_store_url {
        Some(ref url) => {
            log::info!("Using remote image store at {}", url);
            Arc::new(RemoteImageStore::new(url))
        }
        None => {
            log::info!("Using local image store at {:?}", config::uploads_dir());
            Arc::new(LocalImageStore::new(config::uploads_dir(), config::self_url()))
        }
    };

    log::info!("Listening on 0.0.0.0:{}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                db: Arc::clone(&db),
                config: config.clone(),
                storage: Arc::clone(&storage),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::users::config)
            .configure(controllers::notes::config)
            .configure(controllers::uploads::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
