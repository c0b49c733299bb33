use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    dev::Payload,
    web, Error, FromRequest, HttpRequest,
};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::utils::{flash::{self, Flash}, jwt};

pub const SESSION_COOKIE_NAME: &str = "session";

/// Structure qui contient les infos de l'utilisateur connecté
/// Utilisée comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub is_admin: bool,
}

/// Lit et vérifie le cookie de session (None = visiteur anonyme)
pub fn current_identity(req: &HttpRequest) -> Option<AuthUser> {
    let state = req.app_data::<web::Data<AppState>>()?;
    let cookie = req.cookie(SESSION_COOKIE_NAME)?;

    match jwt::verify_token(&state.config.secret_key, cookie.value()) {
        Ok(claims) => Some(AuthUser {
            user_id: claims.sub,
            username: claims.username,
            is_admin: claims.is_admin,
        }),
        Err(e) => {
            tracing::debug!("Rejected session cookie: {}", e);
            None
        }
    }
}

/// Cookie de session posé après un login réussi
pub fn session_cookie(token: String, max_age_hours: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(max_age_hours))
        .finish()
}

pub fn logout_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE_NAME, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// URL de login qui ramène ensuite sur la page demandée
pub fn login_url(next: &str) -> String {
    format!("/login?next={}", encode_query_value(next))
}

fn encode_query_value(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

/// Implémentation de FromRequest pour AuthUser
/// Visiteur anonyme -> redirection vers /login?next=<page demandée>
impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match current_identity(req) {
            Some(user) => ready(Ok(user)),
            None => {
                let response = flash::redirect(
                    &login_url(&request_target(req)),
                    Some(Flash::info("Please log in to access this page.")),
                );
                ready(Err(actix_web::error::InternalError::from_response(
                    "",
                    response,
                ).into()))
            }
        }
    }
}

/// Chemin + query de la requête courante
pub fn request_target(req: &HttpRequest) -> String {
    match req.uri().path_and_query() {
        Some(pq) => pq.as_str().to_string(),
        None => req.path().to_string(),
    }
}
