//! Catalog domain: products and categories.
//!
//! ```text
//! handlers ─► CatalogService ─► ProductRepository ─┬─ PgProductRepository
//!                                                  └─ InMemoryProductRepository
//! ```
//!
//! The cart and order domains read products through [`ProductRepository`]
//! and price lines with [`Product::effective_price`].

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CatalogError, CatalogResult};
pub use models::{
    Category, CreateCategory, CreateProduct, Product, ProductFilter, UpdateProduct,
};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::CatalogService;

#[cfg(any(test, feature = "mock"))]
pub use repository::MockProductRepository;
