// glowcart/app/src/web/handlers/health_handlers.rs

use actix_web::HttpResponse;
use serde_json::json;

/// Liveness only; does not touch the database.
pub async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}
