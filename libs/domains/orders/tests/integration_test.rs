//! PostgreSQL-backed checkout tests. Need Docker:
//! `cargo test -p domain_orders -- --ignored`

use domain_cart::{CartRepository, PgCartRepository};
use domain_catalog::{
    CreateProduct, PgProductRepository, Product, ProductRepository, UpdateProduct,
};
use domain_orders::*;
use rust_decimal::Decimal;
use test_utils::{TestDataBuilder, TestDatabase};

async fn seed_product(repo: &PgProductRepository, builder: &TestDataBuilder, prefix: &str) -> Product {
    repo.create(CreateProduct {
        name: builder.name(prefix, "product"),
        slug: builder.slug(prefix),
        sku: builder.sku(prefix),
        description: None,
        price: Decimal::new(2000, 2),
        sale_price: None,
        stock_quantity: 10,
        in_stock: true,
        category_id: None,
        brand_id: None,
        attributes: serde_json::json!({}),
        specifications: serde_json::json!({}),
        tags: Vec::new(),
        featured_image: None,
    })
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_pg_checkout_converts_cart() {
    let db = TestDatabase::new().await;
    let products = PgProductRepository::new(db.connection());
    let carts = PgCartRepository::new(db.connection());
    let orders = PgOrderRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_checkout_converts_cart");
    let user = builder.user_id();

    let a = seed_product(&products, &builder, "a").await;
    let b = seed_product(&products, &builder, "b").await;
    carts.add_item(&user, a.id, 2, a.price).await.unwrap();
    carts.add_item(&user, b.id, 1, Decimal::new(1550, 2)).await.unwrap();

    let detail = orders
        .checkout(&user, "USD", serde_json::json!({"source": "test"}))
        .await
        .unwrap();
    assert_eq!(detail.order.total_amount, Decimal::new(5550, 2));
    assert_eq!(detail.items.len(), 2);
    assert!(carts.get_active_cart(&user).await.unwrap().is_none());

    let stored = orders.get(detail.order.id).await.unwrap().unwrap();
    assert_eq!(stored.order.order_number, detail.order.order_number);
    assert_eq!(stored.items.len(), 2);

    let listed = orders
        .list_for_user(&user, OrderFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_pg_checkout_rolls_back_when_unavailable() {
    let db = TestDatabase::new().await;
    let products = PgProductRepository::new(db.connection());
    let carts = PgCartRepository::new(db.connection());
    let orders = PgOrderRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_checkout_rolls_back");
    let user = builder.user_id();

    let a = seed_product(&products, &builder, "a").await;
    carts.add_item(&user, a.id, 1, a.price).await.unwrap();
    products
        .update(
            a.id,
            UpdateProduct {
                in_stock: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = orders
        .checkout(&user, "USD", serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Unavailable(_)));
    assert!(carts.get_active_cart(&user).await.unwrap().is_some());
    assert!(
        orders
            .list_for_user(&user, OrderFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_pg_status_guard() {
    let db = TestDatabase::new().await;
    let products = PgProductRepository::new(db.connection());
    let carts = PgCartRepository::new(db.connection());
    let orders = PgOrderRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_status_guard");
    let user = builder.user_id();

    let a = seed_product(&products, &builder, "a").await;
    carts.add_item(&user, a.id, 1, a.price).await.unwrap();
    let order = orders
        .checkout(&user, "USD", serde_json::json!({}))
        .await
        .unwrap()
        .order;

    let paid = orders
        .update_status(order.id, OrderStatus::Pending, OrderStatus::Paid)
        .await
        .unwrap();
    assert_eq!(paid.map(|o| o.status), Some(OrderStatus::Paid));

    let stale = orders
        .update_status(order.id, OrderStatus::Pending, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert!(stale.is_none());
}
