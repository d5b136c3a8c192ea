// glowcart/app/src/models/mod.rs

//! Row types read from and written to the storefront tables.

pub mod cart;
pub mod favorite;
pub mod order;
pub mod product;
pub mod user;

// Re-export the model structs for convenient access
pub use cart::CartLine;
pub use favorite::FavoriteLine;
pub use order::OrderWithItems;
pub use product::{Product, ProductInput};
pub use user::{PublicUser, User};
