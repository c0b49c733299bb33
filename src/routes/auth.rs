use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{current_identity, logout_cookie, session_cookie};
use crate::middleware::AuthUser;
use crate::models::dto::{LoginForm, RegisterForm};
use crate::services::auth_service::AuthService;
use crate::state::AppState;
use crate::utils::flash::{self, Flash};
use crate::utils::jwt;

#[derive(Serialize)]
struct FormPage {
    title: &'static str,
}

#[derive(Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Seuls les chemins locaux sont acceptés comme destination après login
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path,
        _ => "/",
    }
}

fn field_error(errors: &mut ValidationErrors, field: &'static str, message: &str) {
    errors.add(
        field,
        ValidationError::new("taken").with_message(message.to_string().into()),
    );
}

/// GET /signup - Formulaire d'inscription (PUBLIC)
#[get("/signup")]
pub async fn signup_page(req: HttpRequest) -> HttpResponse {
    if current_identity(&req).is_some() {
        return flash::redirect("/", None);
    }
    flash::render(&req, FormPage { title: "Register" })
}

/// POST /signup - Créer un compte (PUBLIC)
#[post("/signup")]
pub async fn signup(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<RegisterForm>,
) -> AppResult<HttpResponse> {
    if current_identity(&req).is_some() {
        return Ok(flash::redirect("/", None));
    }

    // 1. Validation du formulaire + unicité username / email
    let form = form.into_inner();
    let mut errors = form.validate().err().unwrap_or_else(ValidationErrors::new);
    if AuthService::username_taken(&state.db, &form.username).await? {
        field_error(&mut errors, "username", "That username is taken. Please choose a different one.");
    }
    if AuthService::email_taken(&state.db, &form.email).await? {
        field_error(&mut errors, "email", "That email is taken. Please choose a different one.");
    }
    if !errors.is_empty() {
        return Ok(invalid_signup(&form, errors));
    }

    // 2. Créer le compte
    match AuthService::register(&state.db, &form.username, &form.email, &form.password).await {
        Ok(_) => Ok(flash::redirect(
            "/login",
            Some(Flash::success("Your account has been created! You can now log in.")),
        )),
        // Inscription concurrente sur le même username / email
        Err(AppError::Duplicate(message)) => {
            let mut errors = ValidationErrors::new();
            field_error(&mut errors, "username", &message);
            Ok(invalid_signup(&form, errors))
        }
        Err(e) => Err(e),
    }
}

// Le mot de passe n'est jamais renvoyé
fn invalid_signup(form: &RegisterForm, errors: ValidationErrors) -> HttpResponse {
    flash::render_invalid(
        serde_json::json!({
            "title": "Register",
            "form": { "username": form.username, "email": form.email },
            "errors": errors,
        }),
        None,
    )
}

/// GET /login - Formulaire de connexion (PUBLIC)
#[get("/login")]
pub async fn login_page(req: HttpRequest) -> HttpResponse {
    if current_identity(&req).is_some() {
        return flash::redirect("/", None);
    }
    flash::render(&req, FormPage { title: "Login" })
}

/// POST /login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<NextQuery>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    if current_identity(&req).is_some() {
        return Ok(flash::redirect("/", None));
    }

    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        return Ok(flash::render_invalid(
            serde_json::json!({ "title": "Login", "form": { "email": form.email }, "errors": errors }),
            None,
        ));
    }

    // 1. Vérifier email + mot de passe
    let user = match AuthService::authenticate(&state.db, &form.email, &form.password).await {
        Ok(user) => user,
        Err(AppError::InvalidCredentials) => {
            tracing::info!(email = %form.email, "Failed login");
            return Ok(flash::render_invalid(
                serde_json::json!({ "title": "Login", "form": { "email": form.email } }),
                Some(Flash::danger("Login Unsuccessful. Please check email and password")),
            ));
        }
        Err(e) => return Err(e),
    };

    // 2. Générer le token de session
    let token = jwt::generate_token(
        &state.config.secret_key,
        user.id,
        &user.username,
        user.is_admin,
        state.config.session_hours,
    )
    .map_err(AppError::Internal)?;

    // 3. Rediriger vers la page demandée
    let mut response = flash::redirect(
        safe_next(query.next.as_deref()),
        Some(Flash::success("Login successful!")),
    );
    response
        .add_cookie(&session_cookie(token, state.config.session_hours))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(response)
}

/// GET /logout - Se déconnecter (connexion requise)
#[get("/logout")]
pub async fn logout(auth_user: AuthUser) -> AppResult<HttpResponse> {
    let mut response = flash::redirect("/", Some(Flash::info("You have been logged out.")));
    response
        .add_cookie(&logout_cookie())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = auth_user.user_id, "User logged out");
    Ok(response)
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(signup_page)
        .service(signup)
        .service(login_page)
        .service(login)
        .service(logout);
}
