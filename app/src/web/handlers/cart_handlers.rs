// glowcart/app/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::CartLine;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct AddToCartRequestPayload {
  pub product_id: i64,
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
pub struct UpdateCartQuantityPayload {
  pub quantity: i32,
}

fn ensure_positive(quantity: i32) -> Result<(), AppError> {
  if quantity < 1 {
    return Err(AppError::Validation("Quantity must be at least 1".to_string()));
  }
  Ok(())
}

// --- Handler Implementations ---

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, req_payload, auth_user),
  fields(user_id = auth_user.user_id, product_id = req_payload.product_id, quantity = req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  ensure_positive(req_payload.quantity)?;

  let product: Option<i64> = sqlx::query_scalar("SELECT product_id FROM products WHERE product_id = $1")
    .bind(req_payload.product_id)
    .fetch_optional(&app_state.db_pool)
    .await
    .map_err(|e| AppError::db("Error adding to cart", e))?;
  if product.is_none() {
    warn!("Add to cart rejected: product does not exist.");
    return Err(AppError::NotFound("Product not found".to_string()));
  }

  // A repeat add bumps the existing row instead of creating a second one.
  sqlx::query(
    "INSERT INTO cart (user_id, product_id, quantity) VALUES ($1, $2, $3) \
     ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = cart.quantity + EXCLUDED.quantity",
  )
  .bind(auth_user.user_id)
  .bind(req_payload.product_id)
  .bind(req_payload.quantity)
  .execute(&app_state.db_pool)
  .await
  .map_err(|e| AppError::db("Error adding to cart", e))?;

  info!("Product added to cart.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Product added to cart successfully" })))
}

#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let lines: Vec<CartLine> = sqlx::query_as(
    "SELECT c.user_id, c.product_id, c.quantity, p.product_name, p.product_price \
     FROM cart c JOIN products p ON c.product_id = p.product_id \
     WHERE c.user_id = $1 ORDER BY c.product_id",
  )
  .bind(auth_user.user_id)
  .fetch_all(&app_state.db_pool)
  .await
  .map_err(|e| AppError::db("Error fetching cart", e))?;

  Ok(HttpResponse::Ok().json(lines))
}

#[instrument(
  name = "handler::update_cart_quantity",
  skip(app_state, path, req_payload, auth_user),
  fields(user_id = auth_user.user_id, product_id = %path.as_ref())
)]
pub async fn update_cart_quantity_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  req_payload: web::Json<UpdateCartQuantityPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  ensure_positive(req_payload.quantity)?;

  let result = sqlx::query("UPDATE cart SET quantity = $1 WHERE user_id = $2 AND product_id = $3")
    .bind(req_payload.quantity)
    .bind(auth_user.user_id)
    .bind(path.into_inner())
    .execute(&app_state.db_pool)
    .await
    .map_err(|e| AppError::db("Error updating cart", e))?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound("Cart item not found".to_string()));
  }
  Ok(HttpResponse::Ok().json(json!({ "message": "Cart updated successfully" })))
}

#[instrument(
  name = "handler::remove_from_cart",
  skip(app_state, path, auth_user),
  fields(user_id = auth_user.user_id, product_id = %path.as_ref())
)]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  sqlx::query("DELETE FROM cart WHERE user_id = $1 AND product_id = $2")
    .bind(auth_user.user_id)
    .bind(path.into_inner())
    .execute(&app_state.db_pool)
    .await
    .map_err(|e| AppError::db("Error removing from cart", e))?;

  Ok(HttpResponse::Ok().json(json!({ "message": "Product removed from cart successfully" })))
}
