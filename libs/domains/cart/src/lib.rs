//! Shopping cart domain.
//!
//! Each user has at most one `active` cart, created on the first add. Lines
//! are unique per product; adding a product again increments the quantity
//! and refreshes the unit price snapshot, while changing the quantity leaves
//! the snapshot alone.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CartError, CartResult};
pub use models::{
    AddToCart, Cart, CartItem, CartLine, CartProduct, CartStatus, CartView, UpdateCartItem,
};
pub use postgres::PgCartRepository;
pub use repository::{CartRepository, InMemoryCartRepository};
pub use service::CartService;

#[cfg(any(test, feature = "mock"))]
pub use repository::MockCartRepository;
