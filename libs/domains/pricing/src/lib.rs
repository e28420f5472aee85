//! Manufacturing quotes for 3D printing and laser engraving jobs.
//!
//! ```text
//! processing = amount × material rate × quality multiplier
//! subtotal   = processing + setup fee
//! total      = subtotal × rush multiplier (rush jobs only)
//! ```
//!
//! Everything is `Decimal`; rounding to cents happens once, on the way out.

pub mod engine;
pub mod error;
pub mod handlers;
pub mod materials;
pub mod models;

pub use engine::QuoteEngine;
pub use error::{PricingError, PricingResult};
pub use materials::{MATERIALS, Material, find_material};
pub use models::{Quality, Quote, QuoteRequest, ServiceKind};
