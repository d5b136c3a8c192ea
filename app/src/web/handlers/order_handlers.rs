// glowcart/app/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use glowcart::{LineItem, OrderPlacement, OrderRequest, OrderStore};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::OrderWithItems;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

// Line items are aggregated in the query so the history is one round trip.
// Orders whose items were all deleted still come back with an empty list.
pub(crate) const ORDER_WITH_ITEMS_SELECT: &str = "SELECT o.order_id, o.user_id, o.order_date, o.total_price, o.order_status, \
   COALESCE( \
     json_agg( \
       json_build_object( \
         'product_id', oi.product_id, \
         'product_name', p.product_name, \
         'product_price', p.product_price, \
         'quantity', oi.quantity \
       ) ORDER BY oi.order_item_id \
     ) FILTER (WHERE oi.product_id IS NOT NULL), \
     '[]'::json \
   ) AS items \
   FROM orders o \
   LEFT JOIN order_items oi ON o.order_id = oi.order_id \
   LEFT JOIN products p ON oi.product_id = p.product_id";

#[derive(Deserialize, Debug)]
pub struct CreateOrderPayload {
  pub items: Vec<LineItem>,
  pub total_price: Decimal,
}

/// Generic over the store so the same handler serves Postgres and the
/// in-memory backend.
#[instrument(
  name = "handler::create_order",
  skip(placement, req_payload, auth_user),
  fields(user_id = auth_user.user_id, items = req_payload.items.len())
)]
pub async fn create_order_handler<S>(
  placement: web::Data<OrderPlacement<S>>,
  req_payload: web::Json<CreateOrderPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError>
where
  S: OrderStore + 'static,
{
  let payload = req_payload.into_inner();
  let request = OrderRequest::new(auth_user.user_id, payload.items, payload.total_price);

  let placed = placement.place_order(&request).await?;

  info!(order_id = placed.order_id, "Order created.");
  Ok(HttpResponse::Created().json(json!({
    "message": "Order created successfully",
    "order_id": placed.order_id,
  })))
}

#[instrument(name = "handler::order_history", skip(app_state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn order_history_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders: Vec<OrderWithItems> = sqlx::query_as(&format!(
    "{} WHERE o.user_id = $1 GROUP BY o.order_id ORDER BY o.order_date DESC, o.order_id DESC",
    ORDER_WITH_ITEMS_SELECT
  ))
  .bind(auth_user.user_id)
  .fetch_all(&app_state.db_pool)
  .await
  .map_err(|e| AppError::db("Error fetching order history", e))?;

  info!("Fetched {} orders.", orders.len());
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(
  name = "handler::get_order",
  skip(app_state, path, auth_user),
  fields(user_id = auth_user.user_id, order_id = %path.as_ref())
)]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  // Scoped to the caller: someone else's order id reads as not found.
  let order: Option<OrderWithItems> = sqlx::query_as(&format!(
    "{} WHERE o.order_id = $1 AND o.user_id = $2 GROUP BY o.order_id",
    ORDER_WITH_ITEMS_SELECT
  ))
  .bind(path.into_inner())
  .bind(auth_user.user_id)
  .fetch_optional(&app_state.db_pool)
  .await
  .map_err(|e| AppError::db("Error fetching order", e))?;

  order
    .map(|order| HttpResponse::Ok().json(order))
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}
