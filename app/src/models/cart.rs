// glowcart/app/src/models/cart.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A cart row joined with the product's name and current price.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
  pub user_id: i64,
  pub product_id: i64,
  pub quantity: i32,
  pub product_name: String,
  pub product_price: Decimal,
}
