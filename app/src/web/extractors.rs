// glowcart/app/src/web/extractors.rs

use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::errors::AppError;
use crate::services::TokenKeys;

/// The caller identified by a valid `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user_id: i64,
  pub email: String,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    ready(authenticate(req))
  }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
  let keys = req.app_data::<web::Data<TokenKeys>>().ok_or_else(|| {
    warn!("AuthenticatedUser extractor: TokenKeys not registered as app data.");
    AppError::Internal("Token keys are not configured".to_string())
  })?;

  let token = req
    .headers()
    .get(AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|token| !token.is_empty())
    .ok_or_else(|| AppError::Auth("No token provided".to_string()))?;

  let claims = keys.validate(token)?;
  Ok(AuthenticatedUser {
    user_id: claims.user_id,
    email: claims.email,
  })
}
