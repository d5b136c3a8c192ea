// glowcart/app/src/config.rs

use crate::errors::{AppError, Result};
use crate::services::auth_service::MAX_TOKEN_TTL_HOURS;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(value: &str) -> Result<Self> {
    match value.to_ascii_lowercase().as_str() {
      "pretty" | "text" => Ok(LogFormat::Pretty),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}': expected 'pretty' or 'json'", other))),
    }
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub db_max_connections: u32,

  // Identity tokens
  pub jwt_secret: String,
  pub token_ttl_hours: i64,

  /// `None` allows any origin.
  pub cors_allowed_origin: Option<String>,
  pub log_format: LogFormat,
}

// Hand-written so the database URL and the token secret never end up in logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &"[REDACTED]")
      .field("db_max_connections", &self.db_max_connections)
      .field("jwt_secret", &"[REDACTED]")
      .field("token_ttl_hours", &self.token_ttl_hours)
      .field("cors_allowed_origin", &self.cors_allowed_origin)
      .field("log_format", &self.log_format)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source. `lookup` returns `None` for unset names.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let required = |var_name: &str| {
      lookup(var_name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };
    let optional = |var_name: &str| lookup(var_name).filter(|v| !v.trim().is_empty());

    let server_host = optional("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or("SERVER_PORT", optional("SERVER_PORT"), 3000u16)?;
    let database_url = required("DATABASE_URL")?;
    let db_max_connections = parse_or("DB_MAX_CONNECTIONS", optional("DB_MAX_CONNECTIONS"), 10u32)?;
    if db_max_connections == 0 {
      return Err(AppError::Config("DB_MAX_CONNECTIONS must be at least 1".to_string()));
    }

    let jwt_secret = required("JWT_SECRET")?;
    let token_ttl_hours = parse_or("TOKEN_TTL_HOURS", optional("TOKEN_TTL_HOURS"), 24i64)?;
    if token_ttl_hours <= 0 || token_ttl_hours > MAX_TOKEN_TTL_HOURS {
      return Err(AppError::Config(format!(
        "TOKEN_TTL_HOURS must be between 1 and {}",
        MAX_TOKEN_TTL_HOURS
      )));
    }

    let cors_allowed_origin = optional("CORS_ALLOWED_ORIGIN");
    let log_format = match optional("LOG_FORMAT") {
      Some(raw) => raw.parse::<LogFormat>()?,
      None => LogFormat::Pretty,
    };

    Ok(Self {
      server_host,
      server_port,
      database_url,
      db_max_connections,
      jwt_secret,
      token_ttl_hours,
      cors_allowed_origin,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_or<T>(var_name: &str, raw: Option<String>, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    Some(value) => value
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e))),
    None => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| vars.get(name).cloned()
  }

  #[test]
  fn defaults_apply_when_only_required_vars_are_set() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://localhost/glowcart"),
      ("JWT_SECRET", "s3cret"),
    ]))
    .unwrap();

    assert_eq!(cfg.bind_address(), "127.0.0.1:3000");
    assert_eq!(cfg.db_max_connections, 10);
    assert_eq!(cfg.token_ttl_hours, 24);
    assert_eq!(cfg.cors_allowed_origin, None);
    assert_eq!(cfg.log_format, LogFormat::Pretty);
  }

  #[test]
  fn missing_database_url_is_a_config_error() {
    let err = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap_err();
    assert!(matches!(err, AppError::Config(ref m) if m.contains("DATABASE_URL")));
  }

  #[test]
  fn invalid_port_is_rejected() {
    let err = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://localhost/glowcart"),
      ("JWT_SECRET", "s3cret"),
      ("SERVER_PORT", "eighty"),
    ]))
    .unwrap_err();
    assert!(matches!(err, AppError::Config(ref m) if m.contains("SERVER_PORT")));
  }

  #[test]
  fn overrides_are_parsed() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://localhost/glowcart"),
      ("JWT_SECRET", "s3cret"),
      ("SERVER_HOST", "0.0.0.0"),
      ("SERVER_PORT", "8081"),
      ("DB_MAX_CONNECTIONS", "4"),
      ("TOKEN_TTL_HOURS", "2"),
      ("CORS_ALLOWED_ORIGIN", "http://localhost:5173"),
      ("LOG_FORMAT", "JSON"),
    ]))
    .unwrap();

    assert_eq!(cfg.bind_address(), "0.0.0.0:8081");
    assert_eq!(cfg.db_max_connections, 4);
    assert_eq!(cfg.token_ttl_hours, 2);
    assert_eq!(cfg.cors_allowed_origin.as_deref(), Some("http://localhost:5173"));
    assert_eq!(cfg.log_format, LogFormat::Json);
  }

  #[test]
  fn token_ttl_beyond_a_year_is_rejected() {
    let err = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://localhost/glowcart"),
      ("JWT_SECRET", "s3cret"),
      ("TOKEN_TTL_HOURS", "9223372036854775807"),
    ]))
    .unwrap_err();
    assert!(matches!(err, AppError::Config(ref m) if m.contains("TOKEN_TTL_HOURS")));

    let cfg = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://localhost/glowcart"),
      ("JWT_SECRET", "s3cret"),
      ("TOKEN_TTL_HOURS", "8760"),
    ]))
    .unwrap();
    assert_eq!(cfg.token_ttl_hours, MAX_TOKEN_TTL_HOURS);
  }

  #[test]
  fn debug_output_redacts_secrets() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
      ("DATABASE_URL", "postgres://user:pw@localhost/glowcart"),
      ("JWT_SECRET", "s3cret"),
    ]))
    .unwrap();
    let rendered = format!("{:?}", cfg);
    assert!(!rendered.contains("s3cret"));
    assert!(!rendered.contains("pw@"));
  }
}
