use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::CartService;
use crate::domain::cart::{CartLineView, CartView};
use crate::domain::errors::DomainError;
use crate::errors::AppError;
use crate::session::CartSession;

pub const CART_PATH: &str = "/cart";

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    /// Decimal amounts are rendered as strings, e.g. "9.99"
    pub unit_price: String,
    pub quantity: i32,
    pub subtotal: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub total: String,
    pub quantity: i64,
    pub tax: String,
    pub grand_total: String,
    pub items: Vec<CartItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartCountResponse {
    pub cart_count: i64,
}

impl From<CartLineView> for CartItemResponse {
    fn from(line: CartLineView) -> Self {
        Self {
            product_id: line.product_id,
            product_name: line.product_name,
            unit_price: line.unit_price.to_string(),
            quantity: line.quantity,
            subtotal: line.subtotal.to_string(),
        }
    }
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        Self {
            total: view.total.to_string(),
            quantity: view.quantity,
            tax: view.tax.to_string(),
            grand_total: view.grand_total.to_string(),
            items: view.items.into_iter().map(Into::into).collect(),
        }
    }
}

fn redirect_to_cart() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, CART_PATH))
        .finish()
}

/// Run a blocking service call on actix's thread pool.
async fn run_blocking<T, F>(service: web::Data<CartService>, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&CartService) -> Result<T, DomainError> + Send + 'static,
{
    let result = web::block(move || f(service.get_ref()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(result)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart
///
/// Returns the visitor's cart with totals. A visitor without a cart gets a
/// zeroed summary.
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Cart summary", body = CartResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn view_cart(
    service: web::Data<CartService>,
    session: CartSession,
) -> Result<HttpResponse, AppError> {
    let key = session.key().to_string();
    let view = run_blocking(service, move |s| s.view_cart(&key)).await?;

    Ok(HttpResponse::Ok().json(CartResponse::from(view)))
}

/// GET /cart/count
///
/// Number of units in the visitor's cart.
#[utoipa::path(
    get,
    path = "/cart/count",
    responses(
        (status = 200, description = "Cart item count", body = CartCountResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn cart_count(
    service: web::Data<CartService>,
    session: CartSession,
) -> Result<HttpResponse, AppError> {
    let key = session.key().to_string();
    let cart_count = run_blocking(service, move |s| s.count_items(&key)).await?;

    Ok(HttpResponse::Ok().json(CartCountResponse { cart_count }))
}

/// POST /cart/add/{product_id}
///
/// Adds one unit of the product, creating the cart and the line as needed.
#[utoipa::path(
    post,
    path = "/cart/add/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 303, description = "Redirect to the cart"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn add_item(
    service: web::Data<CartService>,
    session: CartSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let key = session.key().to_string();
    run_blocking(service, move |s| s.add_item(&key, product_id)).await?;

    Ok(redirect_to_cart())
}

/// POST /cart/remove/{product_id}
///
/// Removes one unit of the product; the line disappears when its last unit
/// is removed.
#[utoipa::path(
    post,
    path = "/cart/remove/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 303, description = "Redirect to the cart"),
        (status = 404, description = "Cart, product or cart item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn decrement_item(
    service: web::Data<CartService>,
    session: CartSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let key = session.key().to_string();
    run_blocking(service, move |s| s.decrement_or_remove(&key, product_id)).await?;

    Ok(redirect_to_cart())
}

/// POST /cart/remove_item/{product_id}
///
/// Removes the product's line whatever its quantity.
#[utoipa::path(
    post,
    path = "/cart/remove_item/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 303, description = "Redirect to the cart"),
        (status = 404, description = "Cart, product or cart item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn remove_item(
    service: web::Data<CartService>,
    session: CartSession,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let key = session.key().to_string();
    run_blocking(service, move |s| s.remove_item(&key, product_id)).await?;

    Ok(redirect_to_cart())
}
