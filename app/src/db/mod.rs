// glowcart/app/src/db/mod.rs

//! Postgres access that goes beyond a single query in a handler.

pub mod order_store;

pub use order_store::PgOrderStore;
