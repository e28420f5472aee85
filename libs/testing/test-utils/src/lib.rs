//! Shared test utilities for the domain crates.
//!
//! - [`TestDatabase`]: disposable PostgreSQL container with every migration applied
//! - [`TestDataBuilder`]: deterministic ids, slugs and SKUs derived from the test name
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! # async fn example() {
//! let db = TestDatabase::new().await;
//! let builder = TestDataBuilder::from_test_name("checkout_happy_path");
//! let user = builder.user_id();
//! let slug = builder.slug("widget");
//! # }
//! ```

mod postgres;

pub use postgres::TestDatabase;

use uuid::Uuid;

/// Deterministic test data, so reruns of the same test produce the same rows
/// and different tests never collide on unique columns.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Identity provider subject for a test user.
    pub fn user_id(&self) -> String {
        self.user("main")
    }

    /// Distinct subject per `label` within one test.
    pub fn user(&self, label: &str) -> String {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        for (i, b) in label.bytes().enumerate() {
            uuid_bytes[8 + i % 8] ^= b;
        }
        Uuid::from_bytes(uuid_bytes).to_string()
    }

    /// `test-<prefix>-<seed>`; always a valid catalog slug for lowercase
    /// alphanumeric prefixes.
    pub fn slug(&self, prefix: &str) -> String {
        format!("test-{}-{}", prefix, self.seed)
    }

    pub fn sku(&self, prefix: &str) -> String {
        format!("SKU-{}-{}", prefix.to_uppercase(), self.seed)
    }

    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let a = TestDataBuilder::new(42);
        let b = TestDataBuilder::new(42);
        assert_eq!(a.user_id(), b.user_id());
        assert_eq!(a.slug("widget"), b.slug("widget"));
    }

    #[test]
    fn test_different_names_and_labels_differ() {
        let a = TestDataBuilder::from_test_name("test1");
        let b = TestDataBuilder::from_test_name("test2");
        assert_ne!(a.user_id(), b.user_id());
        assert_ne!(a.user("alice"), a.user("bob"));
    }

    #[test]
    fn test_slug_shape() {
        let slug = TestDataBuilder::new(7).slug("widget");
        assert_eq!(slug, "test-widget-7");
        assert_eq!(TestDataBuilder::new(7).sku("widget"), "SKU-WIDGET-7");
    }
}
