// glowcart/app/src/services/auth_service.rs

//! Password hashing and identity tokens.

use crate::errors::AppError; // Application-specific error type
use argon2::{
  password_hash::{
    rand_core::OsRng, // For generating random salts
    PasswordHash,
    PasswordHasher,
    PasswordVerifier,
    SaltString,
  },
  Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

/// Hashes a plain-text password using Argon2.
///
/// # Returns
/// The PHC-formatted hash string, or an `AppError` if the password is empty or
/// hashing fails.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  let argon2_hasher = Argon2::default();

  match argon2_hasher.hash_password(password.as_bytes(), &salt) {
    Ok(password_hash_obj) => {
      debug!("Password hashed successfully.");
      Ok(password_hash_obj.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// # Returns
/// `Ok(true)` on a match, `Ok(false)` on a mismatch. A stored hash that cannot
/// be parsed is an internal error, not a failed login.
#[instrument(
  name = "auth_service::verify_password",
  skip(hashed_password_str, provided_password),
  err(Display),
  fields(hash_len = hashed_password_str.len())
)]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

/// Longest token lifetime accepted from configuration (one year).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Claims carried by an identity token. Field names match what the storefront
/// frontend already decodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
  #[serde(rename = "userId")]
  pub user_id: i64,
  pub email: String,
  pub iat: i64,
  pub exp: i64,
}

/// Signs and checks HS256 identity tokens.
#[derive(Clone)]
pub struct TokenKeys {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl: Duration,
}

impl TokenKeys {
  /// `ttl_hours` is clamped to `1..=MAX_TOKEN_TTL_HOURS`.
  pub fn new(secret: &str, ttl_hours: i64) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      ttl: Duration::hours(ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS)),
    }
  }

  #[instrument(name = "auth_service::issue_token", skip(self, email), err(Display))]
  pub fn issue(&self, user_id: i64, email: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let expires = now
      .checked_add_signed(self.ttl)
      .ok_or_else(|| AppError::Internal("Token expiry is out of range".to_string()))?;
    let claims = Claims {
      user_id,
      email: email.to_string(),
      iat: now.timestamp(),
      exp: expires.timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
  }

  /// Checks signature and expiry and returns the claims.
  pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &self.decoding, &validation)
      .map(|data| data.claims)
      .map_err(|e| {
        warn!(error = %e, "Rejected identity token.");
        AppError::Auth("Invalid or expired token".to_string())
      })
  }
}

impl std::fmt::Debug for TokenKeys {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenKeys").field("ttl", &self.ttl).finish_non_exhaustive()
  }
}
