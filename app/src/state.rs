// glowcart/app/src/state.rs
use crate::config::AppConfig;
use crate::services::TokenKeys;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared by every handler. The order workflow is registered separately as
/// `web::Data<OrderPlacement<_>>` so handlers stay generic over its store.
#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub config: Arc<AppConfig>,
}

impl AppState {
  pub fn new(db_pool: PgPool, config: Arc<AppConfig>) -> Self {
    Self { db_pool, config }
  }

  pub fn token_keys(&self) -> TokenKeys {
    TokenKeys::new(&self.config.jwt_secret, self.config.token_ttl_hours)
  }
}
