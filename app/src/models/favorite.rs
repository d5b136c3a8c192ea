// glowcart/app/src/models/favorite.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FavoriteLine {
  pub user_id: i64,
  pub product_id: i64,
  pub product_name: String,
  pub product_price: Decimal,
}
