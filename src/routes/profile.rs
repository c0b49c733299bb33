use actix_web::{get, web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::dto::OrderWithItems;
use crate::models::users;
use crate::services::auth_service::AuthService;
use crate::services::order_service::OrderService;
use crate::state::AppState;
use crate::utils::flash;

#[derive(Serialize)]
struct ProfileView {
    user: users::Model,
    orders: Vec<OrderWithItems>,
}

/// GET /profile - Compte + historique des commandes (connexion requise)
#[get("/profile")]
pub async fn profile(
    req: HttpRequest,
    auth_user: AuthUser,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let user = AuthService::find_user(&state.db, auth_user.user_id).await?;
    let orders = OrderService::orders_for_user(&state.db, user.id).await?;

    Ok(flash::render(&req, ProfileView { user, orders }))
}

pub fn profile_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(profile);
}
