// glowcart/src/placement.rs

//! The order placement workflow.
//!
//! One placement runs on one transaction: the order header is inserted, then each
//! line item in input order, then the user's cart is emptied, then the
//! transaction commits. Any failure rolls the whole unit back, so callers either
//! see all three effects or none of them. There is no retry and no idempotency
//! key; a placement is a single attempt.

use crate::error::{OrderError, PlacementStep};
use crate::order::{NewOrder, OrderId, OrderRequest, OrderStatus, PlacedOrder};
use crate::store::{OrderStore, OrderTransaction};
use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

/// Places orders against an injected [`OrderStore`].
#[derive(Debug, Clone)]
pub struct OrderPlacement<S> {
  store: S,
}

impl<S: OrderStore> OrderPlacement<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  /// Persists `request` as a new `Pending` order and empties the owner's cart.
  ///
  /// Returns the committed order on success. On failure nothing is visible and
  /// the error says which step broke and whether a retry could help.
  #[instrument(
    name = "order_placement::place_order",
    skip(self, request),
    fields(user_id = request.user_id, items = request.items.len(), total_price = %request.total_price),
    err(Display)
  )]
  pub async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, OrderError> {
    request.validate()?;

    let mut tx = self
      .store
      .begin()
      .await
      .map_err(|e| OrderError::from_storage(PlacementStep::Begin, e))?;

    let placed = match write_order(&mut tx, request).await {
      Ok(placed) => placed,
      Err(err) => {
        warn!(step = ?err.step(), kind = %err.kind(), "Order placement failed, rolling back.");
        if let Err(rollback_err) = tx.rollback().await {
          // The handle is released on drop either way; keep the first error.
          error!(error = %rollback_err, "Rollback after failed order placement also failed.");
        }
        return Err(err);
      }
    };

    tx.commit()
      .await
      .map_err(|e| OrderError::from_storage(PlacementStep::Commit, e))?;

    info!(
      order_id = placed.order_id,
      cleared_cart_entries = placed.cleared_cart_entries,
      "Order placed."
    );
    Ok(placed)
  }
}

async fn write_order<T: OrderTransaction>(tx: &mut T, request: &OrderRequest) -> Result<PlacedOrder, OrderError> {
  let header = NewOrder {
    user_id: request.user_id,
    order_date: Utc::now(),
    total_price: request.total_price,
    status: OrderStatus::Pending,
  };

  let order_id: OrderId = tx
    .insert_order(&header)
    .await
    .map_err(|e| OrderError::from_storage(PlacementStep::InsertOrder, e))?;
  debug!(order_id, "Order header inserted.");

  for item in &request.items {
    tx.insert_order_item(order_id, item)
      .await
      .map_err(|e| OrderError::from_storage(PlacementStep::InsertItems, e))?;
  }
  debug!(order_id, count = request.items.len(), "Order items inserted.");

  let cleared_cart_entries = tx
    .clear_cart(request.user_id)
    .await
    .map_err(|e| OrderError::from_storage(PlacementStep::ClearCart, e))?;
  debug!(order_id, cleared_cart_entries, "Cart cleared.");

  Ok(PlacedOrder {
    order_id,
    user_id: header.user_id,
    placed_at: header.order_date,
    total_price: header.total_price,
    status: header.status,
    item_count: request.items.len(),
    cleared_cart_entries,
  })
}
