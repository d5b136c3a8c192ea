// glowcart/app/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// One aggregated line of an order as shown in the order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderHistoryItem {
  pub product_id: i64,
  pub product_name: Option<String>, // Product may have been deleted since
  pub product_price: Option<Decimal>,
  pub quantity: i32,
}

/// An order header with its line items aggregated by the query.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderWithItems {
  pub order_id: i64,
  pub user_id: i64,
  pub order_date: DateTime<Utc>,
  pub total_price: Decimal,
  pub order_status: String,
  pub items: Json<Vec<OrderHistoryItem>>,
}
