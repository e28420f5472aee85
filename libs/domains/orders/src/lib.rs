//! Orders domain: checkout and order history.
//!
//! Checkout turns the caller's active cart into a `pending` order in one
//! step. Each order line copies the product name and the cart's price
//! snapshot, so later catalog edits never change a placed order.
//!
//! ```text
//! pending ──► paid ──► fulfilled
//!    │          │
//!    └──────────┴──► cancelled
//! ```

pub mod checkout;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use checkout::{OrderPlan, generate_order_number, plan_order};
pub use error::{OrderError, OrderResult};
pub use models::{
    CheckoutRequest, Order, OrderDetail, OrderFilter, OrderItem, OrderStatus, UpdateOrderStatus,
};
pub use postgres::PgOrderRepository;
pub use repository::{InMemoryOrderRepository, OrderRepository};
pub use service::OrderService;

#[cfg(any(test, feature = "mock"))]
pub use repository::MockOrderRepository;
