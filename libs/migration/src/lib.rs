pub use sea_orm_migration::prelude::*;

mod m20250310_000000_bootstrap;
mod m20250310_000001_create_catalog;
mod m20250310_000002_create_carts;
mod m20250310_000003_create_orders;
mod m20250402_000000_add_product_sale_price;
mod m20250415_000000_add_order_metadata;
mod m20250428_000000_single_active_cart;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250310_000000_bootstrap::Migration),
            Box::new(m20250310_000001_create_catalog::Migration),
            Box::new(m20250310_000002_create_carts::Migration),
            Box::new(m20250310_000003_create_orders::Migration),
            Box::new(m20250402_000000_add_product_sale_price::Migration),
            Box::new(m20250415_000000_add_order_metadata::Migration),
            Box::new(m20250428_000000_single_active_cart::Migration),
        ]
    }
}

/// `BEFORE UPDATE` trigger keeping `updated_at` current.
pub(crate) fn touch_trigger_sql(table: &str) -> String {
    format!(
        "CREATE TRIGGER {table}_touch_updated_at BEFORE UPDATE ON {table} \
         FOR EACH ROW EXECUTE FUNCTION util.touch_updated_at()"
    )
}

pub(crate) fn drop_touch_trigger_sql(table: &str) -> String {
    format!("DROP TRIGGER IF EXISTS {table}_touch_updated_at ON {table}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered_and_unique() {
        let names: Vec<String> = Migrator::migrations().iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names.len(), 7);

        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names, sorted);
        assert!(names[0].ends_with("bootstrap"));
        assert!(names[6].ends_with("single_active_cart"));
    }
}
