use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Serialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::{current_identity, login_url};
use crate::models::dto::OrderForm;
use crate::models::product;
use crate::services::catalog_service::{CatalogService, ProductFilters};
use crate::services::order_service::OrderService;
use crate::services::product_service::ProductService;
use crate::state::AppState;
use crate::utils::flash::{self, Flash};

const LATEST_PRODUCTS: u64 = 3;

#[derive(Serialize)]
struct HomeView {
    latest_products: Vec<product::Model>,
}

#[derive(Serialize)]
struct CatalogView {
    products: Vec<product::Model>,
    categories: Vec<String>,
    materials: Vec<String>,
    filters: ProductFilters,
}

#[derive(Serialize)]
struct ProductView {
    product: product::Model,
    quantities: Vec<i32>,
}

/// GET / et /home - Derniers produits ajoutés (PUBLIC)
pub async fn home(req: HttpRequest, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let latest_products = CatalogService::latest_products(&state.db, LATEST_PRODUCTS).await?;
    Ok(flash::render(&req, HomeView { latest_products }))
}

/// GET /products - Catalogue filtré (PUBLIC)
#[get("/products")]
pub async fn catalog(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ProductFilters>,
) -> AppResult<HttpResponse> {
    let filters = query.into_inner().normalized();

    let products = CatalogService::list_products(&state.db, &filters).await?;
    let categories = CatalogService::distinct_categories(&state.db).await?;
    let materials = CatalogService::distinct_materials(&state.db).await?;

    Ok(flash::render(&req, CatalogView { products, categories, materials, filters }))
}

/// GET /product/{id} - Fiche produit + formulaire de commande (PUBLIC)
#[get("/product/{id}")]
pub async fn product_detail(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let product = ProductService::find(&state.db, path.into_inner()).await?;
    Ok(flash::render(&req, ProductView { product, quantities: (1..=5).collect() }))
}

/// POST /product/{id} - Passer commande (connexion requise)
#[post("/product/{id}")]
pub async fn place_order(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    form: web::Form<OrderForm>,
) -> AppResult<HttpResponse> {
    let product_id = path.into_inner();

    // 1. Visiteur anonyme -> login puis retour sur la fiche
    let Some(user) = current_identity(&req) else {
        return Ok(flash::redirect(
            &login_url(&format!("/product/{}", product_id)),
            Some(Flash::info("Please log in to place an order.")),
        ));
    };

    let product = ProductService::find(&state.db, product_id).await?;

    // 2. Valider le formulaire
    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        return Ok(flash::render_invalid(
            serde_json::json!({ "product": product, "form": form, "errors": errors }),
            None,
        ));
    }

    // 3. Créer la commande
    let quantity = form.quantity;
    OrderService::place_order(&state.db, user.user_id, product.id, form).await?;

    Ok(flash::redirect(
        "/profile",
        Some(Flash::success(format!(
            "Your order for {} x {} has been placed successfully!",
            quantity, product.name
        ))),
    ))
}

pub fn shop_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(["/", "/home"]).route(web::get().to(home)))
        .service(catalog)
        .service(product_detail)
        .service(place_order);
}
