// glowcart/app/src/web/handlers/favorite_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::FavoriteLine;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct AddFavoritePayload {
  pub product_id: i64,
}

#[instrument(
  name = "handler::add_favorite",
  skip(app_state, req_payload, auth_user),
  fields(user_id = auth_user.user_id, product_id = req_payload.product_id)
)]
pub async fn add_favorite_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddFavoritePayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  // ON CONFLICT keeps the duplicate check and the insert in one statement.
  let inserted = sqlx::query(
    "INSERT INTO favorites (user_id, product_id) VALUES ($1, $2) ON CONFLICT (user_id, product_id) DO NOTHING",
  )
  .bind(auth_user.user_id)
  .bind(req_payload.product_id)
  .execute(&app_state.db_pool)
  .await
  .map_err(|e| AppError::db("Error adding to favorites", e))?
  .rows_affected();

  if inserted == 0 {
    return Err(AppError::Validation("Already in favorites".to_string()));
  }
  info!("Added to favorites.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Added to favorites successfully" })))
}

#[instrument(name = "handler::get_favorites", skip(app_state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_favorites_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let favorites: Vec<FavoriteLine> = sqlx::query_as(
    "SELECT f.user_id, f.product_id, p.product_name, p.product_price \
     FROM favorites f JOIN products p ON f.product_id = p.product_id \
     WHERE f.user_id = $1 ORDER BY f.product_id",
  )
  .bind(auth_user.user_id)
  .fetch_all(&app_state.db_pool)
  .await
  .map_err(|e| AppError::db("Error fetching favorites", e))?;

  Ok(HttpResponse::Ok().json(favorites))
}

#[instrument(
  name = "handler::remove_favorite",
  skip(app_state, path, auth_user),
  fields(user_id = auth_user.user_id, product_id = %path.as_ref())
)]
pub async fn remove_favorite_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
    .bind(auth_user.user_id)
    .bind(path.into_inner())
    .execute(&app_state.db_pool)
    .await
    .map_err(|e| AppError::db("Error removing from favorites", e))?;

  Ok(HttpResponse::Ok().json(json!({ "message": "Removed from favorites successfully" })))
}
