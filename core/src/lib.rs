// src/lib.rs

//! GlowCart core: order placement for the GlowCart cosmetics storefront.
//!
//! This crate owns the one piece of the storefront that needs more than a single
//! SQL statement: turning a cart snapshot into an order. It provides
//!  - Domain values for orders and line items, with the validation policy.
//!  - A closed error taxonomy (`validation`, `conflict`, `transient_storage`,
//!    `unknown`) so callers can choose between retrying and reporting.
//!  - The `OrderStore` / `OrderTransaction` seam, injected into the workflow
//!    rather than reached through a global pool.
//!  - `OrderPlacement`, the all-or-nothing workflow itself.
//!  - `MemoryStore`, an in-process backend with fault injection.
//!
//! The HTTP server and the Postgres backend live in the `glowcart_app` crate.

pub mod error;
pub mod memory;
pub mod order;
pub mod placement;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::error::{OrderError, OrderErrorKind, PlacementStep, StorageError, StorageResult};
pub use crate::memory::{Fault, MemoryStore, MemoryTransaction};
pub use crate::order::{LineItem, NewOrder, OrderId, OrderRequest, OrderStatus, PlacedOrder, ProductId, UserId};
pub use crate::placement::OrderPlacement;
pub use crate::store::{OrderStore, OrderTransaction};
