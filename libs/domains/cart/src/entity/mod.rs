//! SeaORM entities for the cart tables.

pub mod cart;
pub mod cart_item;
