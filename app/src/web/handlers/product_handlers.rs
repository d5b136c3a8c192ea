// glowcart/app/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::{Product, ProductInput};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

const PRODUCT_SELECT: &str = "SELECT p.product_id, p.product_name, p.brand_id, b.brand_name, p.product_price, \
   p.product_stock, p.product_quantity, p.product_allergy, p.product_weather_suitability, \
   p.product_skintype_preference \
   FROM products p LEFT JOIN brands b ON p.brand_id = b.brand_id";

#[derive(Deserialize, Debug)]
pub struct ListProductsQuery {
  #[serde(rename = "skinType")]
  pub skin_type: Option<String>,
}

/// The `ILIKE` pattern for a skin type query, or `None` when the catalog
/// should not be filtered ("for you" is the storefront's unfiltered tab).
pub fn skin_type_pattern(skin_type: Option<&str>) -> Option<String> {
  let value = skin_type?.trim();
  if value.is_empty() || value.eq_ignore_ascii_case("for you") {
    return None;
  }
  Some(format!("%{}%", value))
}

fn validate_input(input: &ProductInput) -> Result<(), AppError> {
  if input.product_name.trim().is_empty() {
    return Err(AppError::Validation("product_name is required".to_string()));
  }
  if input.product_price < Decimal::ZERO {
    return Err(AppError::Validation("product_price cannot be negative".to_string()));
  }
  if input.product_stock < 0 {
    return Err(AppError::Validation("product_stock cannot be negative".to_string()));
  }
  Ok(())
}

#[instrument(name = "handler::list_products", skip(app_state, query_params), fields(skin_type = ?query_params.skin_type))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let products: Vec<Product> = match skin_type_pattern(query_params.skin_type.as_deref()) {
    Some(pattern) => {
      sqlx::query_as::<_, Product>(&format!("{} WHERE p.product_skintype_preference ILIKE $1 ORDER BY p.product_id", PRODUCT_SELECT))
        .bind(pattern)
        .fetch_all(&app_state.db_pool)
        .await
    }
    None => {
      sqlx::query_as::<_, Product>(&format!("{} ORDER BY p.product_id", PRODUCT_SELECT))
        .fetch_all(&app_state.db_pool)
        .await
    }
  }
  .map_err(|e| AppError::db("Error fetching products", e))?;

  info!("Fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();

  let product: Option<Product> = sqlx::query_as(&format!("{} WHERE p.product_id = $1", PRODUCT_SELECT))
    .bind(product_id)
    .fetch_optional(&app_state.db_pool)
    .await
    .map_err(|e| AppError::db("Error fetching product", e))?;

  match product {
    Some(product) => Ok(HttpResponse::Ok().json(product)),
    None => {
      warn!("Product {} not found.", product_id);
      Err(AppError::NotFound("Product not found".to_string()))
    }
  }
}

#[instrument(
  name = "handler::create_product",
  skip(app_state, req_payload, auth_user),
  fields(user_id = auth_user.user_id)
)]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ProductInput>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let input = req_payload.into_inner();
  validate_input(&input)?;

  let product_id: i64 = sqlx::query_scalar(
    "INSERT INTO products (product_name, brand_id, product_price, product_stock, product_quantity, \
     product_allergy, product_weather_suitability, product_skintype_preference) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING product_id",
  )
  .bind(&input.product_name)
  .bind(input.brand_id)
  .bind(input.product_price)
  .bind(input.product_stock)
  .bind(&input.product_quantity)
  .bind(&input.product_allergy)
  .bind(&input.product_weather_suitability)
  .bind(&input.product_skintype_preference)
  .fetch_one(&app_state.db_pool)
  .await
  .map_err(|e| AppError::db("Error creating product", e))?;

  info!(product_id, "Product created.");
  Ok(HttpResponse::Created().json(json!({
    "message": "Product created successfully",
    "productId": product_id,
  })))
}

#[instrument(
  name = "handler::update_product",
  skip(app_state, path, req_payload, auth_user),
  fields(product_id = %path.as_ref(), user_id = auth_user.user_id)
)]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  req_payload: web::Json<ProductInput>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let input = req_payload.into_inner();
  validate_input(&input)?;

  let result = sqlx::query(
    "UPDATE products SET product_name = $1, brand_id = $2, product_price = $3, product_stock = $4, \
     product_quantity = $5, product_allergy = $6, product_weather_suitability = $7, \
     product_skintype_preference = $8 WHERE product_id = $9",
  )
  .bind(&input.product_name)
  .bind(input.brand_id)
  .bind(input.product_price)
  .bind(input.product_stock)
  .bind(&input.product_quantity)
  .bind(&input.product_allergy)
  .bind(&input.product_weather_suitability)
  .bind(&input.product_skintype_preference)
  .bind(product_id)
  .execute(&app_state.db_pool)
  .await
  .map_err(|e| AppError::db("Error updating product", e))?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound("Product not found".to_string()));
  }
  Ok(HttpResponse::Ok().json(json!({ "message": "Product updated successfully" })))
}

#[instrument(
  name = "handler::delete_product",
  skip(app_state, path, auth_user),
  fields(product_id = %path.as_ref(), user_id = auth_user.user_id)
)]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
    .bind(product_id)
    .execute(&app_state.db_pool)
    .await
    .map_err(|e| AppError::db("Error deleting product", e))?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound("Product not found".to_string()));
  }
  Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}
