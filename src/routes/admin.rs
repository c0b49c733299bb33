use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::dto::{DashboardStats, MessageForm, OrderWithItems, ProductForm, StatusForm};
use crate::models::order::OrderStatus;
use crate::models::product::{self, CATEGORIES};
use crate::models::{message, users};
use crate::services::admin_service::AdminService;
use crate::services::auth_service::AuthService;
use crate::services::message_service::MessageService;
use crate::services::order_service::OrderService;
use crate::services::product_service::{ImageUpload, ProductService};
use crate::state::AppState;
use crate::utils::flash::{self, Flash};

/// Formulaire produit multipart (champs texte + image)
#[derive(MultipartForm)]
pub struct ProductUpload {
    pub name: Text<String>,
    pub category: Text<String>,
    pub material: Text<String>,
    pub price: Text<String>,
    pub description: Text<String>,
    #[multipart(limit = "16MB")]
    pub image: Option<TempFile>,
}

impl ProductUpload {
    /// Champs texte validés, ou erreurs par champ
    fn product_form(&self) -> Result<ProductForm, ValidationErrors> {
        let price = self.price.0.trim().parse::<Decimal>().ok();

        let form = ProductForm {
            name: self.name.0.clone(),
            category: self.category.0.clone(),
            material: self.material.0.clone(),
            // Prix illisible : valeur neutre ici, l'erreur est posée plus bas
            price: price.unwrap_or(Decimal::ONE),
            description: self.description.0.clone(),
        };

        let mut errors = form.validate().err().unwrap_or_else(ValidationErrors::new);
        if price.is_none() {
            errors.add(
                "price",
                ValidationError::new("decimal").with_message("Not a valid decimal value.".into()),
            );
        }

        if errors.is_empty() { Ok(form) } else { Err(errors) }
    }

    /// L'image jointe, None si le champ fichier est resté vide
    async fn image(&self) -> AppResult<Option<ImageUpload>> {
        let Some(file) = &self.image else {
            return Ok(None);
        };
        let file_name = file.file_name.clone().unwrap_or_default();
        if file_name.is_empty() && file.size == 0 {
            return Ok(None);
        }

        let data = tokio::fs::read(file.file.path()).await?;
        Ok(Some(ImageUpload { file_name, data }))
    }

    fn echo(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name.0,
            "category": self.category.0,
            "material": self.material.0,
            "price": self.price.0,
            "description": self.description.0,
        })
    }
}

#[derive(Serialize)]
struct DashboardView {
    stats: DashboardStats,
}

#[derive(Serialize)]
struct ProductsView {
    products: Vec<product::Model>,
}

#[derive(Serialize)]
struct ProductFormView {
    title: &'static str,
    categories: [&'static str; 5],
    product: Option<product::Model>,
}

#[derive(Serialize)]
struct OrdersView {
    orders: Vec<OrderWithItems>,
    statuses: Vec<&'static str>,
}

#[derive(Serialize)]
struct UsersView {
    users: Vec<users::Model>,
}

#[derive(Serialize)]
struct InboxView {
    users_with_messages: Vec<users::Model>,
    selected_user: Option<users::Model>,
    messages: Vec<message::Model>,
}

#[derive(Deserialize)]
pub struct InboxQuery {
    pub user_id: Option<String>,
}

fn invalid_product_form(
    title: &'static str,
    upload: &ProductUpload,
    errors: Option<ValidationErrors>,
    flash: Option<Flash>,
) -> HttpResponse {
    flash::render_invalid(
        serde_json::json!({
            "title": title,
            "categories": CATEGORIES,
            "form": upload.echo(),
            "errors": errors,
        }),
        flash,
    )
}

/// GET /admin/dashboard
#[get("/dashboard")]
pub async fn dashboard(req: HttpRequest, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let stats = AdminService::dashboard_stats(&state.db).await?;
    Ok(flash::render(&req, DashboardView { stats }))
}

/// GET /admin/products
#[get("/products")]
pub async fn products_list(req: HttpRequest, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let products = ProductService::list_all(&state.db).await?;
    Ok(flash::render(&req, ProductsView { products }))
}

/// GET /admin/add_product
#[get("/add_product")]
pub async fn add_product_page(req: HttpRequest) -> HttpResponse {
    flash::render(
        &req,
        ProductFormView { title: "Add Product", categories: CATEGORIES, product: None },
    )
}

/// POST /admin/add_product - Création avec image obligatoire
#[post("/add_product")]
pub async fn add_product(
    state: web::Data<AppState>,
    MultipartForm(upload): MultipartForm<ProductUpload>,
) -> AppResult<HttpResponse> {
    let form = match upload.product_form() {
        Ok(form) => form,
        Err(errors) => return Ok(invalid_product_form("Add Product", &upload, Some(errors), None)),
    };
    let image = upload.image().await?;

    match ProductService::create(&state.db, state.images.as_ref(), form, image).await {
        Ok(_) => Ok(flash::redirect(
            "/admin/products",
            Some(Flash::success("Product added successfully!")),
        )),
        Err(AppError::Upload(message)) => Ok(invalid_product_form(
            "Add Product",
            &upload,
            None,
            Some(Flash::warning(message)),
        )),
        Err(e) => Err(e),
    }
}

/// GET /admin/edit_product/{id}
#[get("/edit_product/{id}")]
pub async fn edit_product_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let product = ProductService::find(&state.db, path.into_inner()).await?;
    Ok(flash::render(
        &req,
        ProductFormView { title: "Edit Product", categories: CATEGORIES, product: Some(product) },
    ))
}

/// POST /admin/edit_product/{id} - Image optionnelle
#[post("/edit_product/{id}")]
pub async fn edit_product(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    MultipartForm(upload): MultipartForm<ProductUpload>,
) -> AppResult<HttpResponse> {
    let product_id = path.into_inner();
    // 404 avant toute validation
    ProductService::find(&state.db, product_id).await?;

    let form = match upload.product_form() {
        Ok(form) => form,
        Err(errors) => return Ok(invalid_product_form("Edit Product", &upload, Some(errors), None)),
    };
    let image = upload.image().await?;

    match ProductService::update(&state.db, state.images.as_ref(), product_id, form, image).await {
        Ok(_) => Ok(flash::redirect(
            "/admin/products",
            Some(Flash::success("Product updated successfully!")),
        )),
        Err(AppError::Upload(message)) => Ok(invalid_product_form(
            "Edit Product",
            &upload,
            None,
            Some(Flash::warning(message)),
        )),
        Err(e) => Err(e),
    }
}

/// POST /admin/delete_product/{id}
#[post("/delete_product/{id}")]
pub async fn delete_product(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    match ProductService::delete(&state.db, state.images.as_ref(), path.into_inner()).await {
        Ok(_) => Ok(flash::redirect(
            "/admin/products",
            Some(Flash::success("Product deleted successfully!")),
        )),
        Err(AppError::Conflict(message)) => {
            Ok(flash::redirect("/admin/products", Some(Flash::danger(message))))
        }
        Err(e) => Err(e),
    }
}

/// GET /admin/orders
#[get("/orders")]
pub async fn orders_list(req: HttpRequest, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let orders = OrderService::all_orders(&state.db).await?;
    let statuses = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
    Ok(flash::render(&req, OrdersView { orders, statuses }))
}

/// POST /admin/update_order_status/{id}
#[post("/update_order_status/{id}")]
pub async fn update_order_status(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    form: web::Form<StatusForm>,
) -> AppResult<HttpResponse> {
    let order_id = path.into_inner();
    let new_status = form.into_inner().status.unwrap_or_default();

    let flash = match OrderService::set_status(&state.db, order_id, &new_status).await {
        Ok(order) => Flash::success(format!("Order {} status updated to {}.", order.id, order.status)),
        Err(AppError::InvalidInput(message)) => Flash::danger(message),
        Err(e) => return Err(e),
    };

    Ok(flash::redirect("/admin/orders", Some(flash)))
}

/// GET /admin/users
#[get("/users")]
pub async fn users_list(req: HttpRequest, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let users = AuthService::list_users(&state.db).await?;
    Ok(flash::render(&req, UsersView { users }))
}

/// Client sélectionné dans la boîte de réception (jamais un admin)
async fn selected_counterparty(
    state: &AppState,
    query: &InboxQuery,
) -> AppResult<Option<users::Model>> {
    let Some(user_id) = query.user_id.as_deref().and_then(|id| id.parse::<i32>().ok()) else {
        return Ok(None);
    };

    match AuthService::find_user(&state.db, user_id).await {
        Ok(user) if !user.is_admin => Ok(Some(user)),
        Ok(_) | Err(AppError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

async fn inbox_view(
    state: &AppState,
    admin_id: i32,
    selected_user: Option<users::Model>,
) -> AppResult<InboxView> {
    let users_with_messages =
        MessageService::counterparties_with_messages(&state.db, admin_id).await?;
    let thread = match &selected_user {
        Some(user) => MessageService::open_thread(&state.db, user.id, admin_id).await?,
        None => Vec::new(),
    };

    Ok(InboxView { users_with_messages, selected_user, messages: thread })
}

/// GET /admin/messages?user_id={id} - Boîte de réception, ouvrir un fil marque ses messages lus
#[get("/messages")]
pub async fn inbox(
    req: HttpRequest,
    auth_user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<InboxQuery>,
) -> AppResult<HttpResponse> {
    let selected_user = selected_counterparty(&state, &query).await?;
    let view = inbox_view(&state, auth_user.user_id, selected_user).await?;
    Ok(flash::render(&req, view))
}

/// POST /admin/messages?user_id={id} - Répondre au client sélectionné
#[post("/messages")]
pub async fn reply_message(
    auth_user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<InboxQuery>,
    form: web::Form<MessageForm>,
) -> AppResult<HttpResponse> {
    let selected_user = selected_counterparty(&state, &query).await?;
    let form = form.into_inner();

    match (selected_user, form.validate().err()) {
        (Some(user), None) => {
            MessageService::send_message(&state.db, auth_user.user_id, user.id, &form.message_text)
                .await?;

            Ok(flash::redirect(
                &format!("/admin/messages?user_id={}", user.id),
                Some(Flash::success(format!("Message sent to {}!", user.username))),
            ))
        }
        // Pas de client sélectionné ou message invalide : boîte réaffichée
        (selected_user, errors) => {
            let view = inbox_view(&state, auth_user.user_id, selected_user).await?;
            Ok(flash::render_invalid(
                serde_json::json!({ "inbox": view, "form": form, "errors": errors }),
                None,
            ))
        }
    }
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard)
        .service(products_list)
        .service(add_product_page)
        .service(add_product)
        .service(edit_product_page)
        .service(edit_product)
        .service(delete_product)
        .service(orders_list)
        .service(update_order_status)
        .service(users_list)
        .service(inbox)
        .service(reply_message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{
        http::{header, StatusCode},
        middleware::from_fn,
        test, App,
    };
    use crate::middleware::admin::require_admin;
    use crate::models::dto::OrderForm;
    use crate::test_utils::{create_product, create_user, session_cookie, TestDb};

    macro_rules! admin_app {
        ($test_db:expr) => {
            test::init_service(
                App::new().app_data(web::Data::new($test_db.state())).service(
                    web::scope("/admin").wrap(from_fn(require_admin)).configure(admin_routes),
                ),
            )
            .await
        };
    }

    fn multipart_body(boundary: &str, fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\nContent-Type: text/plain\r\n\r\n{}\r\n",
                    boundary, name, value
                )
                .as_bytes(),
            );
        }
        if let Some((filename, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    boundary, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        body
    }

    const PRODUCT_FIELDS: [(&str, &str); 5] = [
        ("name", "Sunrise Ring"),
        ("category", "Ring"),
        ("material", "Gold"),
        ("price", "120.00"),
        ("description", "Hand made"),
    ];

    #[actix_web::test]
    async fn test_non_admin_is_redirected_home() {
        let test_db = TestDb::new().await;
        let alice = create_user(&test_db.db, "alice", false).await;
        let app = admin_app!(test_db);

        let req = test::TestRequest::get()
            .uri("/admin/dashboard")
            .cookie(session_cookie(&alice))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
        let flash = resp.response().cookies().find(|c| c.name() == "flash");
        assert!(flash.is_some());
    }

    #[actix_web::test]
    async fn test_anonymous_is_sent_to_login() {
        let test_db = TestDb::new().await;
        let app = admin_app!(test_db);

        let req = test::TestRequest::get().uri("/admin/users").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login?next=/admin/users");
    }

    #[actix_web::test]
    async fn test_dashboard_for_admin() {
        let test_db = TestDb::new().await;
        let admin = create_user(&test_db.db, "admin", true).await;
        create_product(&test_db.db, "Sunrise Ring", "Ring", "Gold", Decimal::new(120, 0)).await;
        let app = admin_app!(test_db);

        let req = test::TestRequest::get()
            .uri("/admin/dashboard")
            .cookie(session_cookie(&admin))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["stats"]["total_products"], 1);
        assert_eq!(body["stats"]["total_users"], 1);
        assert_eq!(body["stats"]["pending_orders"], 0);
    }

    #[actix_web::test]
    async fn test_update_order_status() {
        let test_db = TestDb::new().await;
        let admin = create_user(&test_db.db, "admin", true).await;
        let alice = create_user(&test_db.db, "alice", false).await;
        let ring = create_product(&test_db.db, "Sunrise Ring", "Ring", "Gold", Decimal::new(120, 0)).await;
        let form = OrderForm {
            customer_name: "Alice".to_string(),
            customer_address: "1 Main St".to_string(),
            customer_contact: "555-0100".to_string(),
            quantity: 1,
        };
        let (order, _) = OrderService::place_order(&test_db.db, alice.id, ring.id, form).await.unwrap();
        let app = admin_app!(test_db);

        let status_request = |status: &str| {
            test::TestRequest::post()
                .uri(&format!("/admin/update_order_status/{}", order.id))
                .cookie(session_cookie(&admin))
                .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
                .set_payload(format!("status={}", status))
                .to_request()
        };

        let resp = test::call_service(&app, status_request("Shipped")).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/admin/orders");

        let resp = test::call_service(&app, status_request("Lost")).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let flash_cookie = resp.response().cookies().find(|c| c.name() == "flash").unwrap();
        let req = test::TestRequest::get()
            .uri("/admin/orders")
            .cookie(session_cookie(&admin))
            .cookie(flash_cookie.into_owned())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["flash"]["level"], "danger");
        assert_eq!(body["flash"]["message"], "Invalid status provided.");
        assert_eq!(body["orders"][0]["status"], "Shipped");
    }

    #[actix_web::test]
    async fn test_add_product_with_image() {
        let test_db = TestDb::new().await;
        let admin = create_user(&test_db.db, "admin", true).await;
        let app = admin_app!(test_db);
        let boundary = "----ShopBoundary";

        // Sans image : formulaire réaffiché avec une notice
        let req = test::TestRequest::post()
            .uri("/admin/add_product")
            .cookie(session_cookie(&admin))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            ))
            .set_payload(multipart_body(boundary, &PRODUCT_FIELDS, None))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["flash"]["level"], "warning");

        let req = test::TestRequest::post()
            .uri("/admin/add_product")
            .cookie(session_cookie(&admin))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            ))
            .set_payload(multipart_body(boundary, &PRODUCT_FIELDS, Some(("my ring.png", b"png"))))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/admin/products");

        let saved = ProductService::list_all(&test_db.db).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].image_filename.as_deref().unwrap().ends_with("_my_ring.png"));
        assert_eq!(saved[0].price, Decimal::new(120, 0));
    }

    #[actix_web::test]
    async fn test_inbox_marks_thread_read_and_reply() {
        let test_db = TestDb::new().await;
        let admin = create_user(&test_db.db, "admin", true).await;
        let alice = create_user(&test_db.db, "alice", false).await;
        MessageService::send_message(&test_db.db, alice.id, admin.id, "Hello").await.unwrap();
        let app = admin_app!(test_db);

        let req = test::TestRequest::get()
            .uri(&format!("/admin/messages?user_id={}", alice.id))
            .cookie(session_cookie(&admin))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["users_with_messages"][0]["username"], "alice");
        assert_eq!(body["selected_user"]["id"], alice.id);
        assert_eq!(body["messages"][0]["is_read"], true);

        let req = test::TestRequest::post()
            .uri(&format!("/admin/messages?user_id={}", alice.id))
            .cookie(session_cookie(&admin))
            .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload("message_text=Thanks%21")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
            format!("/admin/messages?user_id={}", alice.id)
        );

        let thread = MessageService::conversation(&test_db.db, alice.id, admin.id).await.unwrap();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[1].message_text, "Thanks!");
    }
}
