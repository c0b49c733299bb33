use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::models::health::HealthResponse;
use crate::state::AppState;

/// GET /health - État du service et de la base (PUBLIC)
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = match state.db.ping().await {
        Ok(()) => "up",
        Err(e) => {
            tracing::error!("Database ping failed: {}", e);
            "down"
        }
    };

    let response = HealthResponse {
        status: if database == "up" { "ok" } else { "degraded" }.to_string(),
        database: database.to_string(),
        time: Utc::now(),
    };

    if database == "up" {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
