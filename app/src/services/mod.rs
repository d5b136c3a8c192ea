// glowcart/app/src/services/mod.rs

pub mod auth_service;

pub use auth_service::TokenKeys;
