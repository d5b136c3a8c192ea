// tests/atomicity_tests.rs
mod common;

use common::*;
use glowcart::{Fault, LineItem, OrderErrorKind, OrderRequest, PlacementStep};
use serial_test::serial;

/// Arms `fault` at `step`, runs the reference order and checks nothing leaked.
async fn assert_rolled_back(step: PlacementStep, fault: Fault, expected: OrderErrorKind) {
  let store = seeded_store();
  let workflow = placement(&store);
  let cart_before = store.cart_entries(SHOPPER);
  store.inject_fault(step, fault);

  let err = workflow
    .place_order(&shopper_request())
    .await
    .expect_err("placement must fail");

  assert_eq!(err.kind(), expected, "unexpected kind for failure at {}", step);
  assert_eq!(err.step(), Some(step));
  assert_eq!(store.order_count(), 0, "order leaked after failure at {}", step);
  assert!(store.orders_for(SHOPPER).is_empty());
  assert_eq!(store.cart_entries(SHOPPER), cart_before, "cart changed after failure at {}", step);
  assert_eq!(store.open_transactions(), 0, "transaction not released after failure at {}", step);
}

#[tokio::test]
#[serial]
async fn test_failure_opening_transaction() {
  setup_tracing();
  assert_rolled_back(PlacementStep::Begin, Fault::Unavailable, OrderErrorKind::TransientStorage).await;
}

#[tokio::test]
#[serial]
async fn test_failure_inserting_order_header() {
  setup_tracing();
  assert_rolled_back(PlacementStep::InsertOrder, Fault::Backend, OrderErrorKind::Unknown).await;
}

#[tokio::test]
#[serial]
async fn test_failure_inserting_items() {
  setup_tracing();
  assert_rolled_back(PlacementStep::InsertItems, Fault::Constraint, OrderErrorKind::Conflict).await;
}

#[tokio::test]
#[serial]
async fn test_failure_clearing_cart() {
  setup_tracing();
  assert_rolled_back(PlacementStep::ClearCart, Fault::Unavailable, OrderErrorKind::TransientStorage).await;
}

#[tokio::test]
#[serial]
async fn test_failure_on_commit() {
  setup_tracing();
  assert_rolled_back(PlacementStep::Commit, Fault::Unavailable, OrderErrorKind::TransientStorage).await;
}

#[tokio::test]
#[serial]
async fn test_unknown_product_is_a_conflict_and_rolls_back() {
  setup_tracing();
  let store = seeded_store();
  let workflow = placement(&store);

  // Second item references a product outside the catalog.
  let request = OrderRequest::new(
    SHOPPER,
    vec![LineItem::new(3, 2), LineItem::new(99, 1)],
    price("45.50"),
  );
  let err = workflow.place_order(&request).await.unwrap_err();

  assert_eq!(err.kind(), OrderErrorKind::Conflict);
  assert_eq!(err.step(), Some(PlacementStep::InsertItems));
  assert!(err.to_string().contains("99"));
  assert_eq!(store.order_count(), 0);
  assert_eq!(store.cart_entries(SHOPPER).len(), 2);
}

#[tokio::test]
#[serial]
async fn test_store_recovers_once_fault_is_cleared() {
  setup_tracing();
  let store = seeded_store();
  let workflow = placement(&store);

  store.inject_fault(PlacementStep::ClearCart, Fault::Unavailable);
  let err = workflow.place_order(&shopper_request()).await.unwrap_err();
  assert!(err.is_retryable());

  store.clear_faults();
  let placed = workflow.place_order(&shopper_request()).await.unwrap();

  // The failed attempt consumed an id, like a database sequence would.
  assert_eq!(placed.order_id, 2);
  assert_eq!(store.order_count(), 1);
  assert!(store.cart_entries(SHOPPER).is_empty());
}

#[tokio::test]
#[serial]
async fn test_dropped_transaction_discards_writes() {
  use glowcart::{NewOrder, OrderStatus, OrderStore, OrderTransaction};

  setup_tracing();
  let store = seeded_store();

  {
    let mut tx = store.begin().await.unwrap();
    let order_id = tx
      .insert_order(&NewOrder {
        user_id: SHOPPER,
        order_date: chrono::Utc::now(),
        total_price: price("1.00"),
        status: OrderStatus::Pending,
      })
      .await
      .unwrap();
    tx.insert_order_item(order_id, &LineItem::new(3, 1)).await.unwrap();
    tx.clear_cart(SHOPPER).await.unwrap();
    assert_eq!(store.open_transactions(), 1);
    // Dropped here without commit or rollback.
  }

  assert_eq!(store.open_transactions(), 0);
  assert_eq!(store.order_count(), 0);
  assert_eq!(store.cart_entries(SHOPPER).len(), 2);
}

#[tokio::test]
#[serial]
async fn test_commit_only_removes_cart_rows_seen_by_clear() {
  use glowcart::{NewOrder, OrderStatus, OrderStore, OrderTransaction};

  setup_tracing();
  let store = seeded_store();

  let mut tx = store.begin().await.unwrap();
  let order_id = tx
    .insert_order(&NewOrder {
      user_id: SHOPPER,
      order_date: chrono::Utc::now(),
      total_price: price("45.50"),
      status: OrderStatus::Pending,
    })
    .await
    .unwrap();
  tx.insert_order_item(order_id, &LineItem::new(3, 2)).await.unwrap();
  let cleared = tx.clear_cart(SHOPPER).await.unwrap();
  assert_eq!(cleared, 2);

  // Lands after the DELETE ran, so the committing transaction never saw it.
  store.add_to_cart(SHOPPER, 4, 1);
  tx.commit().await.unwrap();

  let remaining = store.cart_entries(SHOPPER);
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].product_id, 4);
  assert_eq!(remaining[0].quantity, 1);
}
