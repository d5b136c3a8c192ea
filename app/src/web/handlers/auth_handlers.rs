// glowcart/app/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::error::ErrorKind;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::{PublicUser, User};
use crate::services::auth_service::{hash_password, verify_password};
use crate::services::TokenKeys;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

const USER_COLUMNS: &str = "user_id, username, email, password, full_name, age, allergies, skin_type";

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct RegisterRequestPayload {
  pub username: String,
  pub email: String,
  pub password: String,
  pub full_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct AdditionalInfoPayload {
  pub age: Option<i32>,
  pub allergies: Option<String>,
  pub skin_type: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateProfilePayload {
  pub username: String,
  pub full_name: Option<String>,
  pub age: Option<i32>,
  pub skin_type: Option<String>,
  pub allergies: Option<String>,
}

// --- Handler Implementations ---

#[instrument(
  name = "handler::register",
  skip(app_state, token_keys, req_payload),
  fields(req_email = %req_payload.email)
)]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  token_keys: web::Data<TokenKeys>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  if payload.username.trim().is_empty() || payload.email.trim().is_empty() {
    return Err(AppError::Validation("Username and email are required".to_string()));
  }

  let existing: Option<i64> = sqlx::query_scalar("SELECT user_id FROM users WHERE email = $1")
    .bind(&payload.email)
    .fetch_optional(&app_state.db_pool)
    .await
    .map_err(|e| AppError::db("Error registering user", e))?;
  if existing.is_some() {
    warn!("Registration rejected: email already registered.");
    return Err(AppError::Validation("User already exists".to_string()));
  }

  let hashed = hash_password(&payload.password)?;

  let user_id: i64 = sqlx::query_scalar(
    "INSERT INTO users (username, email, password, full_name) VALUES ($1, $2, $3, $4) RETURNING user_id",
  )
  .bind(&payload.username)
  .bind(&payload.email)
  .bind(&hashed)
  .bind(&payload.full_name)
  .fetch_one(&app_state.db_pool)
  .await
  .map_err(|e| {
    // Lost a race with a concurrent registration for the same email.
    let duplicate = matches!(&e, sqlx::Error::Database(db_err) if db_err.kind() == ErrorKind::UniqueViolation);
    if duplicate {
      AppError::Validation("User already exists".to_string())
    } else {
      AppError::db("Error registering user", e)
    }
  })?;

  let token = token_keys.issue(user_id, &payload.email)?;
  info!(user_id, "User registered successfully.");

  Ok(HttpResponse::Created().json(json!({
    "message": "User registered successfully",
    "userId": user_id,
    "token": token,
    "user": {
      "id": user_id,
      "username": payload.username,
      "email": payload.email,
      "full_name": payload.full_name,
    },
  })))
}

#[instrument(
  name = "handler::login",
  skip(app_state, token_keys, req_payload),
  fields(req_email = %req_payload.email)
)]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  token_keys: web::Data<TokenKeys>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let user: Option<User> = sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
    .bind(&req_payload.email)
    .fetch_optional(&app_state.db_pool)
    .await
    .map_err(|e| AppError::db("Error logging in", e))?;

  let user = match user {
    Some(user) => user,
    None => {
      warn!("Login failed: unknown email.");
      return Err(AppError::Auth("Invalid credentials".to_string()));
    }
  };

  if !verify_password(&user.password, &req_payload.password)? {
    warn!(user_id = user.user_id, "Login failed: wrong password.");
    return Err(AppError::Auth("Invalid credentials".to_string()));
  }

  let token = token_keys.issue(user.user_id, &user.email)?;
  info!(user_id = user.user_id, "Login successful.");

  Ok(HttpResponse::Ok().json(json!({
    "token": token,
    "user": PublicUser::from(&user),
  })))
}

#[instrument(
  name = "handler::update_additional_info",
  skip(app_state, req_payload, auth_user),
  fields(user_id = auth_user.user_id)
)]
pub async fn update_additional_info_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AdditionalInfoPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let result = sqlx::query("UPDATE users SET age = $1, allergies = $2, skin_type = $3 WHERE email = $4")
    .bind(payload.age)
    .bind(&payload.allergies)
    .bind(&payload.skin_type)
    .bind(&auth_user.email)
    .execute(&app_state.db_pool)
    .await
    .map_err(|e| AppError::db("Error updating additional info", e))?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound("User not found".to_string()));
  }

  info!("Additional info updated.");
  Ok(HttpResponse::Ok().json(json!({
    "message": "Additional info updated successfully",
    "user": {
      "age": payload.age,
      "allergies": payload.allergies,
      "skin_type": payload.skin_type,
    },
  })))
}

#[instrument(name = "handler::get_profile", skip(app_state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let user: Option<User> = sqlx::query_as(&format!("SELECT {} FROM users WHERE user_id = $1", USER_COLUMNS))
    .bind(auth_user.user_id)
    .fetch_optional(&app_state.db_pool)
    .await
    .map_err(|e| AppError::db("Error fetching profile", e))?;

  // `User` never serializes its password hash.
  user
    .map(|user| HttpResponse::Ok().json(user))
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[instrument(
  name = "handler::update_profile",
  skip(app_state, req_payload, auth_user),
  fields(user_id = auth_user.user_id)
)]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<UpdateProfilePayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  sqlx::query(
    "UPDATE users SET username = $1, full_name = $2, age = $3, skin_type = $4, allergies = $5 WHERE user_id = $6",
  )
  .bind(&payload.username)
  .bind(&payload.full_name)
  .bind(payload.age)
  .bind(&payload.skin_type)
  .bind(&payload.allergies)
  .bind(auth_user.user_id)
  .execute(&app_state.db_pool)
  .await
  .map_err(|e| AppError::db("Error updating profile", e))?;

  Ok(HttpResponse::Ok().json(json!({ "message": "Profile updated successfully" })))
}

#[instrument(name = "handler::delete_profile", skip(app_state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  sqlx::query("DELETE FROM users WHERE user_id = $1")
    .bind(auth_user.user_id)
    .execute(&app_state.db_pool)
    .await
    .map_err(|e| AppError::db("Error deleting profile", e))?;

  info!("Profile deleted.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Profile deleted successfully" })))
}
