// glowcart/app/src/db/order_store.rs

//! `OrderStore` over a sqlx Postgres pool.
//!
//! Each placement borrows one pooled connection for the life of one
//! `sqlx::Transaction`. If the transaction is dropped without commit, sqlx rolls
//! it back and returns the connection to the pool.

use async_trait::async_trait;
use glowcart::{LineItem, NewOrder, OrderId, OrderStore, OrderTransaction, StorageError, StorageResult, UserId};
use sqlx::error::ErrorKind;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

// SQLSTATE codes that mean "try again".
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

#[derive(Debug, Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  type Tx = PgOrderTransaction;

  #[instrument(name = "pg_order_store::begin", skip(self), err(Display))]
  async fn begin(&self) -> StorageResult<PgOrderTransaction> {
    let tx = self.pool.begin().await.map_err(classify_sqlx_error)?;
    Ok(PgOrderTransaction { tx })
  }
}

pub struct PgOrderTransaction {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTransaction for PgOrderTransaction {
  async fn insert_order(&mut self, order: &NewOrder) -> StorageResult<OrderId> {
    let order_id: i64 = sqlx::query_scalar(
      "INSERT INTO orders (user_id, order_date, total_price, order_status) VALUES ($1, $2, $3, $4) RETURNING order_id",
    )
    .bind(order.user_id)
    .bind(order.order_date)
    .bind(order.total_price)
    .bind(order.status.as_str())
    .fetch_one(&mut *self.tx)
    .await
    .map_err(classify_sqlx_error)?;
    debug!(order_id, "Inserted order header.");
    Ok(order_id)
  }

  async fn insert_order_item(&mut self, order_id: OrderId, item: &LineItem) -> StorageResult<()> {
    sqlx::query("INSERT INTO order_items (order_id, product_id, quantity) VALUES ($1, $2, $3)")
      .bind(order_id)
      .bind(item.product_id)
      .bind(item.quantity)
      .execute(&mut *self.tx)
      .await
      .map_err(classify_sqlx_error)?;
    Ok(())
  }

  async fn clear_cart(&mut self, user_id: UserId) -> StorageResult<u64> {
    let result = sqlx::query("DELETE FROM cart WHERE user_id = $1")
      .bind(user_id)
      .execute(&mut *self.tx)
      .await
      .map_err(classify_sqlx_error)?;
    Ok(result.rows_affected())
  }

  async fn commit(self) -> StorageResult<()> {
    self.tx.commit().await.map_err(classify_sqlx_error)
  }

  async fn rollback(self) -> StorageResult<()> {
    self.tx.rollback().await.map_err(classify_sqlx_error)
  }
}

/// Sorts a driver error into the storage taxonomy.
pub fn classify_sqlx_error(err: sqlx::Error) -> StorageError {
  let transient_or_constraint = match &err {
    sqlx::Error::Database(db_err) => {
      let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
      match db_err.kind() {
        ErrorKind::UniqueViolation
        | ErrorKind::ForeignKeyViolation
        | ErrorKind::NotNullViolation
        | ErrorKind::CheckViolation => Some(StorageError::Constraint(db_err.message().to_string())),
        _ if code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED => {
          Some(StorageError::Unavailable(db_err.message().to_string()))
        }
        _ => None,
      }
    }
    sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed => {
      Some(StorageError::Unavailable(err.to_string()))
    }
    _ => None,
  };
  transient_or_constraint.unwrap_or_else(|| StorageError::Backend { source: err.into() })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pool_exhaustion_is_transient() {
    assert!(matches!(
      classify_sqlx_error(sqlx::Error::PoolTimedOut),
      StorageError::Unavailable(_)
    ));
  }

  #[test]
  fn connection_loss_is_transient() {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
    assert!(matches!(classify_sqlx_error(sqlx::Error::Io(io)), StorageError::Unavailable(_)));
  }

  #[test]
  fn decode_problems_are_backend_errors() {
    assert!(matches!(
      classify_sqlx_error(sqlx::Error::RowNotFound),
      StorageError::Backend { .. }
    ));
  }

  // Needs a scratch database: GLOWCART_TEST_DATABASE_URL=postgres://... cargo test -- --ignored
  #[actix_web::test]
  #[ignore]
  async fn placement_round_trips_through_postgres() {
    use crate::models::OrderWithItems;
    use crate::web::handlers::order_handlers::ORDER_WITH_ITEMS_SELECT;
    use glowcart::{OrderPlacement, OrderRequest};
    use rust_decimal_macros::dec;

    let url = std::env::var("GLOWCART_TEST_DATABASE_URL").expect("GLOWCART_TEST_DATABASE_URL");
    let pool = PgPool::connect(&url).await.unwrap();
    sqlx::raw_sql(include_str!("../../schema.sql")).execute(&pool).await.unwrap();

    let user_id: i64 = sqlx::query_scalar(
      "INSERT INTO users (username, email, password) VALUES ('pg-test', $1, 'x') RETURNING user_id",
    )
    .bind(format!("pg-test-{}@example.com", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()))
    .fetch_one(&pool)
    .await
    .unwrap();
    let product_id: i64 = sqlx::query_scalar(
      "INSERT INTO products (product_name, product_price) VALUES ('Rose Toner', 19.50) RETURNING product_id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO cart (user_id, product_id, quantity) VALUES ($1, $2, 2)")
      .bind(user_id)
      .bind(product_id)
      .execute(&pool)
      .await
      .unwrap();

    let placement = OrderPlacement::new(PgOrderStore::new(pool.clone()));
    let placed = placement
      .place_order(&OrderRequest::new(user_id, vec![LineItem::new(product_id, 2)], dec!(39.00)))
      .await
      .unwrap();
    assert_eq!(placed.cleared_cart_entries, 1);

    let orders: Vec<OrderWithItems> = sqlx::query_as(&format!(
      "{} WHERE o.user_id = $1 GROUP BY o.order_id ORDER BY o.order_date DESC, o.order_id DESC",
      ORDER_WITH_ITEMS_SELECT
    ))
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, placed.order_id);
    assert_eq!(orders[0].order_status, "Pending");
    assert_eq!(orders[0].total_price, dec!(39.00));
    assert_eq!(orders[0].items.0.len(), 1);
    assert_eq!(orders[0].items.0[0].product_name.as_deref(), Some("Rose Toner"));
    assert_eq!(orders[0].items.0[0].quantity, 2);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart WHERE user_id = $1")
      .bind(user_id)
      .fetch_one(&pool)
      .await
      .unwrap();
    assert_eq!(remaining, 0);
  }
}
