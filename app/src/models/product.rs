// glowcart/app/src/models/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog row joined with its brand name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub product_id: i64,
  pub product_name: String,
  pub brand_id: Option<i64>,
  pub brand_name: Option<String>,
  pub product_price: Decimal,
  pub product_stock: i32,
  pub product_quantity: Option<String>, // Pack size, e.g. "50ml"
  pub product_allergy: Option<String>,
  pub product_weather_suitability: Option<String>,
  pub product_skintype_preference: Option<String>,
}

/// Body of product create and update requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
  pub product_name: String,
  pub brand_id: Option<i64>,
  pub product_price: Decimal,
  #[serde(default)]
  pub product_stock: i32,
  pub product_quantity: Option<String>,
  pub product_allergy: Option<String>,
  pub product_weather_suitability: Option<String>,
  pub product_skintype_preference: Option<String>,
}
