// glowcart/app/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use glowcart::{OrderError, OrderErrorKind};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  /// A query failed; `message` is what the client sees.
  #[error("{message}: {source}")]
  Database {
    message: String,
    #[source]
    source: sqlx::Error,
  },

  #[error("Order Error: {source}")]
  Order {
    #[from]
    source: OrderError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Wraps a query failure with the message the client should see.
  pub fn db(message: &str, source: sqlx::Error) -> Self {
    AppError::Database {
      message: message.to_string(),
      source,
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Config(_) | AppError::Database { .. } | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
      AppError::Order { source } => match source.kind() {
        OrderErrorKind::Validation => StatusCode::BAD_REQUEST,
        OrderErrorKind::Conflict => StatusCode::CONFLICT,
        OrderErrorKind::TransientStorage => StatusCode::SERVICE_UNAVAILABLE,
        OrderErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }

  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }

    let body = match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::NotFound(m) => json!({ "message": m }),
      AppError::Config(_) => json!({ "message": "Configuration issue" }),
      AppError::Database { message, .. } => json!({ "message": message }),
      AppError::Internal(_) => json!({ "message": "An internal error occurred" }),
      AppError::Order { source } => match source {
        OrderError::Validation(m) => json!({ "message": m, "kind": source.kind().as_str() }),
        _ => json!({
          "message": "Error creating order",
          "kind": source.kind().as_str(),
          "retryable": source.is_retryable(),
        }),
      },
    };
    HttpResponse::build(status).json(body)
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::body::to_bytes;
  use glowcart::{PlacementStep, StorageError};

  async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.error_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body()).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[actix_web::test]
  async fn order_errors_map_to_distinct_statuses() {
    let conflict = AppError::from(OrderError::from_storage(
      PlacementStep::InsertItems,
      StorageError::Constraint("fk".to_string()),
    ));
    let (status, body) = body_json(conflict).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Error creating order");
    assert_eq!(body["kind"], "conflict");
    assert_eq!(body["retryable"], false);

    let transient = AppError::from(OrderError::from_storage(
      PlacementStep::ClearCart,
      StorageError::Unavailable("pool timed out".to_string()),
    ));
    let (status, body) = body_json(transient).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "transient_storage");
    assert_eq!(body["retryable"], true);
  }

  #[actix_web::test]
  async fn order_validation_is_a_bad_request_with_its_message() {
    let err = AppError::from(OrderError::Validation("An order must contain at least one item.".to_string()));
    let (status, body) = body_json(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "An order must contain at least one item.");
    assert_eq!(body["kind"], "validation");
  }

  #[actix_web::test]
  async fn database_errors_hide_driver_details() {
    let err = AppError::db("Error fetching cart", sqlx::Error::PoolTimedOut);
    let (status, body) = body_json(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Error fetching cart" }));
  }

  #[actix_web::test]
  async fn auth_errors_are_unauthorized() {
    let (status, body) = body_json(AppError::Auth("Invalid credentials".to_string())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
  }
}
