use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error,
};
use sea_orm::EntityTrait;

use crate::error::AppError;
use crate::middleware::auth::{current_identity, login_url, request_target};
use crate::models::users;
use crate::state::AppState;
use crate::utils::flash::{self, Flash};

/// Garde du scope /admin, évaluée avant chaque route admin
/// - anonyme -> page de login
/// - connecté sans is_admin -> accueil + notice, jamais de données admin
///
/// Le rôle est relu en base à chaque requête, le claim `is_admin` seul ne suffit pas
pub async fn require_admin(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<EitherBody<impl MessageBody>>, Error> {
    let identity = current_identity(req.request());
    let is_admin = match &identity {
        Some(user) if user.is_admin => still_admin(&req, user.user_id).await?,
        _ => false,
    };

    let response = match identity {
        Some(_) if is_admin => {
            return next.call(req).await.map(ServiceResponse::map_into_left_body);
        }
        Some(user) => {
            tracing::warn!(user_id = user.user_id, path = %req.path(), "Non-admin user denied");
            flash::redirect(
                "/",
                Some(Flash::danger("You do not have permission to access this page.")),
            )
        }
        None => flash::redirect(
            &login_url(&request_target(req.request())),
            Some(Flash::info("Please log in to access this page.")),
        ),
    };

    Ok(req.into_response(response).map_into_right_body())
}

async fn still_admin(req: &ServiceRequest, user_id: i32) -> Result<bool, AppError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        return Err(AppError::Internal("application state missing".to_string()));
    };
    let user = users::Entity::find_by_id(user_id).one(&state.db).await?;
    Ok(user.is_some_and(|u| u.is_admin))
}
