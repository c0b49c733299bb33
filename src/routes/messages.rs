use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::dto::MessageForm;
use crate::models::{message, users};
use crate::services::message_service::MessageService;
use crate::state::AppState;
use crate::utils::flash::{self, Flash};

#[derive(Serialize)]
struct MessagesView {
    messages: Vec<message::Model>,
}

/// L'admin destinataire, ou la redirection à renvoyer s'il n'existe pas
async fn admin_or_redirect(
    state: &AppState,
) -> AppResult<Result<users::Model, HttpResponse>> {
    match MessageService::admin_for_messaging(&state.db).await {
        Ok(admin) => Ok(Ok(admin)),
        Err(AppError::ServiceUnavailable(message)) => {
            tracing::warn!("Messaging requested but no admin account exists");
            Ok(Err(flash::redirect("/", Some(Flash::danger(message)))))
        }
        Err(e) => Err(e),
    }
}

/// GET /messages - Conversation avec l'admin (connexion requise)
#[get("/messages")]
pub async fn messages_page(
    req: HttpRequest,
    auth_user: AuthUser,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let admin = match admin_or_redirect(&state).await? {
        Ok(admin) => admin,
        Err(redirect) => return Ok(redirect),
    };

    let messages = MessageService::conversation(&state.db, auth_user.user_id, admin.id).await?;
    Ok(flash::render(&req, MessagesView { messages }))
}

/// POST /messages - Écrire à l'admin (connexion requise)
#[post("/messages")]
pub async fn send_message(
    auth_user: AuthUser,
    state: web::Data<AppState>,
    form: web::Form<MessageForm>,
) -> AppResult<HttpResponse> {
    let admin = match admin_or_redirect(&state).await? {
        Ok(admin) => admin,
        Err(redirect) => return Ok(redirect),
    };

    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        let messages = MessageService::conversation(&state.db, auth_user.user_id, admin.id).await?;
        return Ok(flash::render_invalid(
            serde_json::json!({ "messages": messages, "form": form, "errors": errors }),
            None,
        ));
    }

    MessageService::send_message(&state.db, auth_user.user_id, admin.id, &form.message_text).await?;

    Ok(flash::redirect(
        "/messages",
        Some(Flash::success("Your message has been sent to the admin!")),
    ))
}

pub fn messages_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(messages_page).service(send_message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::{header, StatusCode}, test, App};
    use crate::test_utils::{create_user, session_cookie, TestDb};

    fn post_message(text_param: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/messages")
            .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload(format!("message_text={}", text_param))
    }

    #[actix_web::test]
    async fn test_no_admin_redirects_home() {
        let test_db = TestDb::new().await;
        let alice = create_user(&test_db.db, "alice", false).await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(test_db.state())).configure(messages_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/messages").cookie(session_cookie(&alice)).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[actix_web::test]
    async fn test_send_and_read_conversation() {
        let test_db = TestDb::new().await;
        let admin = create_user(&test_db.db, "admin", true).await;
        let alice = create_user(&test_db.db, "alice", false).await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(test_db.state())).configure(messages_routes),
        )
        .await;

        let req = post_message("Where+is+my+ring%3F").cookie(session_cookie(&alice)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/messages");

        let req = test::TestRequest::get().uri("/messages").cookie(session_cookie(&alice)).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["message_text"], "Where is my ring?");
        assert_eq!(messages[0]["receiver_id"], admin.id);
    }

    #[actix_web::test]
    async fn test_message_length_bounds() {
        let test_db = TestDb::new().await;
        create_user(&test_db.db, "admin", true).await;
        let alice = create_user(&test_db.db, "alice", false).await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(test_db.state())).configure(messages_routes),
        )
        .await;

        let req = post_message("").cookie(session_cookie(&alice)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let too_long = "a".repeat(501);
        let req = post_message(&too_long).cookie(session_cookie(&alice)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let longest = "a".repeat(500);
        let req = post_message(&longest).cookie(session_cookie(&alice)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);

        let req = post_message("a").cookie(session_cookie(&alice)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);
    }
}
