// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use glowcart::{LineItem, MemoryStore, OrderPlacement, OrderRequest, ProductId, UserId};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::Level;

/// Product ids the fixture catalog knows about.
pub const CATALOG: [ProductId; 5] = [1, 2, 3, 4, 5];

pub const SHOPPER: UserId = 7;
pub const OTHER_SHOPPER: UserId = 8;

/// A catalog-backed store where `SHOPPER` has products 3 and 5 in the cart and
/// `OTHER_SHOPPER` has product 1.
pub fn seeded_store() -> MemoryStore {
  let store = MemoryStore::with_catalog(CATALOG);
  store.add_to_cart(SHOPPER, 3, 2);
  store.add_to_cart(SHOPPER, 5, 1);
  store.add_to_cart(OTHER_SHOPPER, 1, 4);
  store
}

pub fn placement(store: &MemoryStore) -> OrderPlacement<MemoryStore> {
  OrderPlacement::new(store.clone())
}

pub fn price(value: &str) -> Decimal {
  Decimal::from_str(value).expect("valid decimal literal")
}

/// The two-item order from the reference scenario: 2 x product 3, 1 x product 5, 45.50.
pub fn shopper_request() -> OrderRequest {
  OrderRequest::new(
    SHOPPER,
    vec![LineItem::new(3, 2), LineItem::new(5, 1)],
    price("45.50"),
  )
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
