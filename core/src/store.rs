// glowcart/src/store.rs

//! Storage seams used by the order placement workflow.
//!
//! A store hands out one transaction per placement. Every write issued through
//! an [`OrderTransaction`] stays invisible to other readers until
//! [`OrderTransaction::commit`] succeeds. Dropping a transaction without
//! committing must discard its writes and release the underlying handle.

use crate::error::StorageResult;
use crate::order::{LineItem, NewOrder, OrderId, UserId};
use async_trait::async_trait;

#[async_trait]
pub trait OrderStore: Send + Sync {
  type Tx: OrderTransaction;

  /// Acquires a connection and opens a transaction on it.
  async fn begin(&self) -> StorageResult<Self::Tx>;
}

#[async_trait]
pub trait OrderTransaction: Send {
  /// Writes the order header and returns the generated id.
  async fn insert_order(&mut self, order: &NewOrder) -> StorageResult<OrderId>;

  async fn insert_order_item(&mut self, order_id: OrderId, item: &LineItem) -> StorageResult<()>;

  /// Deletes every cart entry of `user_id`, returning how many went away.
  async fn clear_cart(&mut self, user_id: UserId) -> StorageResult<u64>;

  async fn commit(self) -> StorageResult<()>;

  async fn rollback(self) -> StorageResult<()>;
}
