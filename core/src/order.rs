// glowcart/src/order.rs

//! Order domain values shared by the workflow, the stores and the HTTP layer.

use crate::error::OrderError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type UserId = i64;
pub type ProductId = i64;
pub type OrderId = i64;

/// Lifecycle state of an order. New orders are always `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
  Pending,
}

impl OrderStatus {
  /// The exact string stored in `orders.order_status`.
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "Pending",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One product/quantity pair of a cart snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
  pub product_id: ProductId,
  pub quantity: i32,
}

impl LineItem {
  pub fn new(product_id: ProductId, quantity: i32) -> Self {
    Self { product_id, quantity }
  }
}

/// Input to the order placement workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
  pub user_id: UserId,
  pub items: Vec<LineItem>,
  /// Computed by the caller. Not checked against catalog prices.
  pub total_price: Decimal,
}

impl OrderRequest {
  pub fn new(user_id: UserId, items: Vec<LineItem>, total_price: Decimal) -> Self {
    Self {
      user_id,
      items,
      total_price,
    }
  }

  /// Rejects requests that would produce a degenerate order.
  pub fn validate(&self) -> Result<(), OrderError> {
    if self.items.is_empty() {
      return Err(OrderError::Validation(
        "An order must contain at least one item.".to_string(),
      ));
    }
    if let Some(bad) = self.items.iter().find(|item| item.quantity < 1) {
      return Err(OrderError::Validation(format!(
        "Quantity for product {} must be at least 1, got {}.",
        bad.product_id, bad.quantity
      )));
    }
    if self.total_price < Decimal::ZERO {
      return Err(OrderError::Validation(format!(
        "Total price cannot be negative, got {}.",
        self.total_price
      )));
    }
    Ok(())
  }
}

/// The header row written in the first step of placement.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
  pub user_id: UserId,
  pub order_date: DateTime<Utc>,
  pub total_price: Decimal,
  pub status: OrderStatus,
}

/// Outcome of a committed placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedOrder {
  pub order_id: OrderId,
  pub user_id: UserId,
  pub placed_at: DateTime<Utc>,
  pub total_price: Decimal,
  pub status: OrderStatus,
  pub item_count: usize,
  pub cleared_cart_entries: u64,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::OrderErrorKind;
  use rust_decimal_macros::dec;

  #[test]
  fn empty_item_list_is_rejected() {
    let request = OrderRequest::new(7, vec![], dec!(0));
    let err = request.validate().unwrap_err();
    assert_eq!(err.kind(), OrderErrorKind::Validation);
  }

  #[test]
  fn non_positive_quantity_is_rejected() {
    let request = OrderRequest::new(7, vec![LineItem::new(3, 2), LineItem::new(5, 0)], dec!(10));
    let err = request.validate().unwrap_err();
    assert!(err.to_string().contains("product 5"));
  }

  #[test]
  fn negative_total_is_rejected_but_zero_is_fine() {
    let negative = OrderRequest::new(7, vec![LineItem::new(3, 1)], dec!(-0.01));
    assert!(negative.validate().is_err());

    let free = OrderRequest::new(7, vec![LineItem::new(3, 1)], dec!(0.00));
    assert!(free.validate().is_ok());
  }

  #[test]
  fn line_items_deserialize_from_request_json() {
    let items: Vec<LineItem> =
      serde_json::from_str(r#"[{"product_id":3,"quantity":2},{"product_id":5,"quantity":1}]"#).unwrap();
    assert_eq!(items, vec![LineItem::new(3, 2), LineItem::new(5, 1)]);
  }

  #[test]
  fn pending_is_stored_capitalized() {
    assert_eq!(OrderStatus::Pending.to_string(), "Pending");
  }
}
