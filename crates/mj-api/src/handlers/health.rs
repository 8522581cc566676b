//! Liveness probe.

use actix_web::{web, HttpResponse};
use serde_json::json;

use super::AppState;

pub async fn health(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "geminiConfigured": data.ai.is_configured(),
    }))
}
