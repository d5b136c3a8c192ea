// glowcart/src/memory.rs

//! A process-local [`OrderStore`] backed by `parking_lot` locks.
//!
//! Writes made through a [`MemoryTransaction`] are staged and only applied to the
//! shared tables, all at once, on commit. Order ids come from a counter that is
//! never rewound, the same way a database sequence behaves across rollbacks.
//!
//! Faults can be armed per [`PlacementStep`] so tests can force a failure at any
//! point of the workflow.
//!
//! IMPORTANT: lock guards taken here are blocking and are never held across an
//! `.await`.

use crate::error::{PlacementStep, StorageError, StorageResult};
use crate::order::{LineItem, NewOrder, OrderId, ProductId, UserId};
use crate::store::{OrderStore, OrderTransaction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// The failure a [`MemoryStore`] reports when an armed step is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
  Constraint,
  Unavailable,
  Backend,
}

impl Fault {
  fn into_error(self, step: PlacementStep) -> StorageError {
    match self {
      Fault::Constraint => StorageError::Constraint(format!("injected constraint violation at {}", step)),
      Fault::Unavailable => StorageError::Unavailable(format!("injected outage at {}", step)),
      Fault::Backend => StorageError::Backend {
        source: anyhow::anyhow!("injected backend failure at {}", step),
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredOrder {
  pub order_id: OrderId,
  pub user_id: UserId,
  pub order_date: DateTime<Utc>,
  pub total_price: Decimal,
  pub order_status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredOrderItem {
  pub order_id: OrderId,
  pub product_id: ProductId,
  pub quantity: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartEntry {
  pub user_id: UserId,
  pub product_id: ProductId,
  pub quantity: i32,
}

#[derive(Debug)]
struct MemoryState {
  next_order_id: OrderId,
  // None accepts any product id.
  catalog: Option<HashSet<ProductId>>,
  orders: BTreeMap<OrderId, StoredOrder>,
  order_items: Vec<StoredOrderItem>,
  cart: Vec<CartEntry>,
  faults: HashMap<PlacementStep, Fault>,
  open_transactions: usize,
}

impl Default for MemoryState {
  fn default() -> Self {
    Self {
      next_order_id: 1,
      catalog: None,
      orders: BTreeMap::new(),
      order_items: Vec::new(),
      cart: Vec::new(),
      faults: HashMap::new(),
      open_transactions: 0,
    }
  }
}

impl MemoryState {
  fn check_fault(&self, step: PlacementStep) -> StorageResult<()> {
    match self.faults.get(&step) {
      Some(fault) => Err(fault.into_error(step)),
      None => Ok(()),
    }
  }
}

/// Cheap to clone; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// A store that rejects line items whose product is not in `product_ids`,
  /// mirroring the `order_items.product_id` foreign key.
  pub fn with_catalog(product_ids: impl IntoIterator<Item = ProductId>) -> Self {
    let store = Self::new();
    store.state.write().catalog = Some(product_ids.into_iter().collect());
    store
  }

  /// Adds to a user's cart, bumping the quantity if the product is already there.
  pub fn add_to_cart(&self, user_id: UserId, product_id: ProductId, quantity: i32) {
    let mut state = self.state.write();
    match state
      .cart
      .iter_mut()
      .find(|entry| entry.user_id == user_id && entry.product_id == product_id)
    {
      Some(entry) => entry.quantity += quantity,
      None => state.cart.push(CartEntry {
        user_id,
        product_id,
        quantity,
      }),
    }
  }

  /// Makes every later call at `step` fail with `fault` until cleared.
  pub fn inject_fault(&self, step: PlacementStep, fault: Fault) {
    self.state.write().faults.insert(step, fault);
  }

  pub fn clear_faults(&self) {
    self.state.write().faults.clear();
  }

  pub fn order(&self, order_id: OrderId) -> Option<StoredOrder> {
    self.state.read().orders.get(&order_id).cloned()
  }

  /// Committed orders of `user_id`, newest first.
  pub fn orders_for(&self, user_id: UserId) -> Vec<StoredOrder> {
    let state = self.state.read();
    let mut orders: Vec<StoredOrder> = state.orders.values().filter(|o| o.user_id == user_id).cloned().collect();
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(b.order_id.cmp(&a.order_id)));
    orders
  }

  pub fn order_items(&self, order_id: OrderId) -> Vec<StoredOrderItem> {
    self
      .state
      .read()
      .order_items
      .iter()
      .filter(|item| item.order_id == order_id)
      .copied()
      .collect()
  }

  pub fn cart_entries(&self, user_id: UserId) -> Vec<CartEntry> {
    self
      .state
      .read()
      .cart
      .iter()
      .filter(|entry| entry.user_id == user_id)
      .copied()
      .collect()
  }

  pub fn order_count(&self) -> usize {
    self.state.read().orders.len()
  }

  /// Transactions handed out by `begin` and not yet dropped.
  pub fn open_transactions(&self) -> usize {
    self.state.read().open_transactions
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  type Tx = MemoryTransaction;

  async fn begin(&self) -> StorageResult<MemoryTransaction> {
    let mut state = self.state.write();
    state.check_fault(PlacementStep::Begin)?;
    state.open_transactions += 1;
    trace!(open = state.open_transactions, "memory transaction opened");
    Ok(MemoryTransaction {
      state: Arc::clone(&self.state),
      staged_orders: Vec::new(),
      staged_items: Vec::new(),
      cleared_cart: Vec::new(),
    })
  }
}

/// Staged writes against a [`MemoryStore`]. Dropping it discards them.
#[derive(Debug)]
pub struct MemoryTransaction {
  state: Arc<RwLock<MemoryState>>,
  staged_orders: Vec<StoredOrder>,
  staged_items: Vec<StoredOrderItem>,
  // (user, product) keys the DELETE matched; rows added later survive commit.
  cleared_cart: Vec<(UserId, ProductId)>,
}

#[async_trait]
impl OrderTransaction for MemoryTransaction {
  async fn insert_order(&mut self, order: &NewOrder) -> StorageResult<OrderId> {
    let order_id = {
      let mut state = self.state.write();
      state.check_fault(PlacementStep::InsertOrder)?;
      let id = state.next_order_id;
      state.next_order_id += 1;
      id
    };
    self.staged_orders.push(StoredOrder {
      order_id,
      user_id: order.user_id,
      order_date: order.order_date,
      total_price: order.total_price,
      order_status: order.status.as_str().to_string(),
    });
    Ok(order_id)
  }

  async fn insert_order_item(&mut self, order_id: OrderId, item: &LineItem) -> StorageResult<()> {
    {
      let state = self.state.read();
      state.check_fault(PlacementStep::InsertItems)?;
      if let Some(catalog) = &state.catalog {
        if !catalog.contains(&item.product_id) {
          return Err(StorageError::Constraint(format!(
            "order_items.product_id {} does not reference an existing product",
            item.product_id
          )));
        }
      }
    }
    if !self.staged_orders.iter().any(|o| o.order_id == order_id) && self.state.read().orders.get(&order_id).is_none() {
      return Err(StorageError::Constraint(format!(
        "order_items.order_id {} does not reference an existing order",
        order_id
      )));
    }
    self.staged_items.push(StoredOrderItem {
      order_id,
      product_id: item.product_id,
      quantity: item.quantity,
    });
    Ok(())
  }

  async fn clear_cart(&mut self, user_id: UserId) -> StorageResult<u64> {
    let state = self.state.read();
    state.check_fault(PlacementStep::ClearCart)?;
    let matched: Vec<(UserId, ProductId)> = state
      .cart
      .iter()
      .filter(|entry| entry.user_id == user_id)
      .map(|entry| (entry.user_id, entry.product_id))
      .collect();
    drop(state);
    let removed = matched.len() as u64;
    self.cleared_cart.extend(matched);
    Ok(removed)
  }

  async fn commit(mut self) -> StorageResult<()> {
    let mut state = self.state.write();
    state.check_fault(PlacementStep::Commit)?;

    for order in self.staged_orders.drain(..) {
      state.orders.insert(order.order_id, order);
    }
    state.order_items.append(&mut self.staged_items);
    let cleared = std::mem::take(&mut self.cleared_cart);
    state
      .cart
      .retain(|entry| !cleared.contains(&(entry.user_id, entry.product_id)));
    debug!(orders = state.orders.len(), "memory transaction committed");
    Ok(())
  }

  async fn rollback(self) -> StorageResult<()> {
    debug!(
      discarded_orders = self.staged_orders.len(),
      discarded_items = self.staged_items.len(),
      "memory transaction rolled back"
    );
    Ok(())
  }
}

impl Drop for MemoryTransaction {
  fn drop(&mut self) {
    let mut state = self.state.write();
    state.open_transactions = state.open_transactions.saturating_sub(1);
  }
}
