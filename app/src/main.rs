// glowcart/app/src/main.rs

mod config;
mod db;
mod errors;
mod models;
mod services;
mod state;
mod web;

use crate::config::{AppConfig, LogFormat};
use crate::db::PgOrderStore;
use crate::state::AppState;

use actix_cors::Cors;
use actix_web::{web as actix_data, App, HttpServer};
use glowcart::OrderPlacement;
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  // RUST_LOG overrides the default level
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration

  match format {
    LogFormat::Pretty => builder.init(),
    LogFormat::Json => builder.json().init(),
  }
}

fn build_cors(allowed_origin: Option<&str>) -> Cors {
  let cors = Cors::default().allow_any_method().allow_any_header().max_age(3600);
  match allowed_origin {
    Some(origin) => cors.allowed_origin(origin),
    None => cors.allow_any_origin(),
  }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      init_tracing(LogFormat::Pretty);
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(io::Error::new(io::ErrorKind::InvalidInput, e.to_string()));
    }
  };
  init_tracing(app_config.log_format);
  tracing::info!(config = ?app_config, "Starting storefront server...");

  let db_pool = PgPoolOptions::new()
    .max_connections(app_config.db_max_connections)
    .connect(&app_config.database_url)
    .await
    .map_err(|e| {
      tracing::error!(error = %e, "Failed to connect to the database.");
      io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string())
    })?;

  // Borrow one connection up front so a bad URL or credentials fail at startup.
  match db_pool.acquire().await {
    Ok(_conn) => tracing::info!("Database connected successfully"),
    Err(e) => {
      tracing::error!(error = %e, "Database ping failed.");
      return Err(io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string()));
    }
  }

  let app_state = AppState::new(db_pool.clone(), app_config.clone());
  let token_keys = actix_data::Data::new(app_state.token_keys());
  let placement = actix_data::Data::new(OrderPlacement::new(PgOrderStore::new(db_pool)));
  let app_state = actix_data::Data::new(app_state);

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  let cors_origin = app_config.cors_allowed_origin.clone();
  HttpServer::new(move || {
    App::new()
      .app_data(app_state.clone())
      .app_data(token_keys.clone())
      .app_data(placement.clone())
      .app_data(web::json_config())
      .app_data(web::path_config())
      .wrap(build_cors(cors_origin.as_deref()))
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(web::configure_app_routes::<PgOrderStore>)
  })
  .bind(&server_address)?
  .run()
  .await
}
