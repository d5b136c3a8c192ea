// glowcart/src/error.rs
use anyhow::Error as AnyhowError;
use std::fmt;
use thiserror::Error;

/// Failure reported by a storage backend.
///
/// Backends classify their native errors into one of these three buckets so the
/// workflow can decide how to surface them without knowing the driver.
#[derive(Debug, Error)]
pub enum StorageError {
  /// A schema constraint rejected the write (foreign key, unique, not-null, check).
  #[error("Constraint violated: {0}")]
  Constraint(String),

  /// The backend could not serve the request right now (connection lost, pool
  /// exhausted, deadlock, serialization failure). Retrying may succeed.
  #[error("Storage unavailable: {0}")]
  Unavailable(String),

  #[error("Storage backend error. Source: {source}")]
  Backend {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for StorageError {
  fn from(err: AnyhowError) -> Self {
    StorageError::Backend { source: err }
  }
}

/// The point in the order placement workflow where a storage failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementStep {
  Begin,
  InsertOrder,
  InsertItems,
  ClearCart,
  Commit,
}

impl PlacementStep {
  pub fn as_str(&self) -> &'static str {
    match self {
      PlacementStep::Begin => "begin",
      PlacementStep::InsertOrder => "insert_order",
      PlacementStep::InsertItems => "insert_items",
      PlacementStep::ClearCart => "clear_cart",
      PlacementStep::Commit => "commit",
    }
  }
}

impl fmt::Display for PlacementStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Machine-readable tag for an [`OrderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderErrorKind {
  Validation,
  Conflict,
  TransientStorage,
  Unknown,
}

impl OrderErrorKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderErrorKind::Validation => "validation",
      OrderErrorKind::Conflict => "conflict",
      OrderErrorKind::TransientStorage => "transient_storage",
      OrderErrorKind::Unknown => "unknown",
    }
  }
}

impl fmt::Display for OrderErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Why an order could not be placed.
///
/// Whatever the variant, the transaction has been rolled back and nothing the
/// workflow wrote is visible.
#[derive(Debug, Error)]
pub enum OrderError {
  #[error("Invalid order: {0}")]
  Validation(String),

  #[error("Order conflicts with stored data at step '{step}': {message}")]
  Conflict { step: PlacementStep, message: String },

  #[error("Storage temporarily unavailable at step '{step}': {message}")]
  TransientStorage { step: PlacementStep, message: String },

  #[error("Order creation failed at step '{step}'. Source: {source}")]
  Unknown {
    step: PlacementStep,
    #[source]
    source: AnyhowError,
  },
}

impl OrderError {
  /// Maps a backend failure observed at `step` into the caller-facing taxonomy.
  pub fn from_storage(step: PlacementStep, err: StorageError) -> Self {
    match err {
      StorageError::Constraint(message) => OrderError::Conflict { step, message },
      StorageError::Unavailable(message) => OrderError::TransientStorage { step, message },
      StorageError::Backend { source } => OrderError::Unknown { step, source },
    }
  }

  pub fn kind(&self) -> OrderErrorKind {
    match self {
      OrderError::Validation(_) => OrderErrorKind::Validation,
      OrderError::Conflict { .. } => OrderErrorKind::Conflict,
      OrderError::TransientStorage { .. } => OrderErrorKind::TransientStorage,
      OrderError::Unknown { .. } => OrderErrorKind::Unknown,
    }
  }

  /// The step that failed, if the failure came from storage.
  pub fn step(&self) -> Option<PlacementStep> {
    match self {
      OrderError::Validation(_) => None,
      OrderError::Conflict { step, .. }
      | OrderError::TransientStorage { step, .. }
      | OrderError::Unknown { step, .. } => Some(*step),
    }
  }

  /// Only transient storage failures are worth another attempt.
  pub fn is_retryable(&self) -> bool {
    matches!(self, OrderError::TransientStorage { .. })
  }
}

pub type StorageResult<T, E = StorageError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn storage_errors_map_onto_order_kinds() {
    let conflict = OrderError::from_storage(
      PlacementStep::InsertItems,
      StorageError::Constraint("fk_order_items_product".to_string()),
    );
    assert_eq!(conflict.kind(), OrderErrorKind::Conflict);
    assert_eq!(conflict.step(), Some(PlacementStep::InsertItems));
    assert!(!conflict.is_retryable());

    let transient = OrderError::from_storage(
      PlacementStep::ClearCart,
      StorageError::Unavailable("connection reset".to_string()),
    );
    assert_eq!(transient.kind(), OrderErrorKind::TransientStorage);
    assert!(transient.is_retryable());

    let unknown = OrderError::from_storage(
      PlacementStep::Commit,
      StorageError::from(anyhow::anyhow!("protocol desync")),
    );
    assert_eq!(unknown.kind(), OrderErrorKind::Unknown);
    assert!(unknown.to_string().contains("commit"));
  }

  #[test]
  fn validation_has_no_step() {
    let err = OrderError::Validation("empty".to_string());
    assert_eq!(err.step(), None);
    assert_eq!(err.kind().as_str(), "validation");
  }
}
