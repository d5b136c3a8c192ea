// glowcart/app/src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
  pub user_id: i64,
  pub username: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password: String,
  pub full_name: Option<String>,
  pub age: Option<i32>,
  pub allergies: Option<String>,
  pub skin_type: Option<String>,
}

/// The `user` object returned by register and login.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
  pub id: i64,
  pub username: String,
  pub email: String,
  pub skin_type: Option<String>,
  pub full_name: Option<String>,
}

impl From<&User> for PublicUser {
  fn from(user: &User) -> Self {
    Self {
      id: user.user_id,
      username: user.username.clone(),
      email: user.email.clone(),
      skin_type: user.skin_type.clone(),
      full_name: user.full_name.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn password_hash_is_never_serialized() {
    let user = User {
      user_id: 1,
      username: "rosa".to_string(),
      email: "rosa@example.com".to_string(),
      password: "$argon2id$v=19$secret".to_string(),
      full_name: Some("Rosa Diaz".to_string()),
      age: Some(29),
      allergies: None,
      skin_type: Some("oily".to_string()),
    };
    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("password").is_none());
    assert_eq!(json["skin_type"], "oily");
  }

  #[test]
  fn public_user_reports_unset_skin_type_as_null() {
    let user = User {
      user_id: 2,
      username: "noor".to_string(),
      email: "noor@example.com".to_string(),
      password: "$argon2id$v=19$secret".to_string(),
      full_name: None,
      age: None,
      allergies: None,
      skin_type: None,
    };
    let json = serde_json::to_value(PublicUser::from(&user)).unwrap();
    assert!(json.get("skin_type").is_some());
    assert!(json["skin_type"].is_null());
  }
}
