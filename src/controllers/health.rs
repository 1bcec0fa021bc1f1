use actix_web::{HttpResponse, Responder, web};

/// Root probe used by deploy platforms
async fn index() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Server is online"
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index));
}
