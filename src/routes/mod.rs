pub mod admin;
pub mod auth;
pub mod health;
pub mod messages;
pub mod profile;
pub mod shop;

use actix_web::{middleware::from_fn, web, HttpResponse};

use crate::error::AppError;
use crate::middleware::admin::require_admin;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health_check)
        .service(
            web::scope("/admin")
                .wrap(from_fn(require_admin))
                .configure(admin::admin_routes),
        )
        .configure(shop::shop_routes)
        .configure(auth::auth_routes)
        .configure(profile::profile_routes)
        .configure(messages::messages_routes)
        .default_service(web::to(not_found));
}

async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("route".to_string()))
}
