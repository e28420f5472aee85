use async_trait::async_trait;
use chrono::Utc;
use domain_cart::{CartRepository, InMemoryCartRepository};
use domain_catalog::{InMemoryProductRepository, ProductRepository};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::checkout::plan_order;
use crate::error::{OrderError, OrderResult};
use crate::models::{Order, OrderDetail, OrderFilter, OrderItem, OrderStatus};

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Converts the user's active cart into a `pending` order atomically:
    /// either the order exists and the cart is `converted`, or nothing
    /// changed.
    async fn checkout(
        &self,
        user_id: &str,
        currency: &str,
        metadata: serde_json::Value,
    ) -> OrderResult<OrderDetail>;

    /// The user's orders, newest first.
    async fn list_for_user(&self, user_id: &str, filter: OrderFilter) -> OrderResult<Vec<Order>>;

    async fn get(&self, id: Uuid) -> OrderResult<Option<OrderDetail>>;

    /// Sets `to` only while the order is still in `from`; `None` otherwise.
    async fn update_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> OrderResult<Option<Order>>;
}

/// Attempts before an in-memory checkout gives up on a cart that keeps
/// changing underneath it.
const CHECKOUT_ATTEMPTS: usize = 3;

#[derive(Debug, Default)]
struct Store {
    orders: HashMap<Uuid, Order>,
    items: HashMap<Uuid, Vec<OrderItem>>,
}

/// In-memory implementation over the in-memory cart and catalog.
#[derive(Debug, Clone)]
pub struct InMemoryOrderRepository {
    store: Arc<RwLock<Store>>,
    carts: InMemoryCartRepository,
    products: Arc<InMemoryProductRepository>,
}

impl InMemoryOrderRepository {
    pub fn new(carts: InMemoryCartRepository, products: Arc<InMemoryProductRepository>) -> Self {
        Self {
            store: Arc::default(),
            carts,
            products,
        }
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn checkout(
        &self,
        user_id: &str,
        currency: &str,
        metadata: serde_json::Value,
    ) -> OrderResult<OrderDetail> {
        for _ in 0..CHECKOUT_ATTEMPTS {
            let Some(cart) = self.carts.get_active_cart(user_id).await? else {
                return Err(OrderError::EmptyCart);
            };
            let lines = self.carts.list_items(cart.id).await?;
            let ids = lines.iter().map(|l| l.product_id).collect();
            let products: HashMap<_, _> = self
                .products
                .get_many(ids)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect();

            let plan = plan_order(user_id, currency, metadata.clone(), &lines, &products, Utc::now())?;

            if self.carts.convert_if_unchanged(cart.id, &lines).await {
                let mut store = self.store.write().await;
                store.orders.insert(plan.order.id, plan.order.clone());
                store.items.insert(plan.order.id, plan.items.clone());
                return Ok(plan.into());
            }
            tracing::debug!(cart_id = %cart.id, "Cart changed during checkout, retrying");
        }

        Err(OrderError::Conflict(
            "Cart changed during checkout, please retry".to_string(),
        ))
    }

    async fn list_for_user(&self, user_id: &str, filter: OrderFilter) -> OrderResult<Vec<Order>> {
        let store = self.store.read().await;
        let mut orders: Vec<Order> = store
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(orders
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.page_size() as usize)
            .collect())
    }

    async fn get(&self, id: Uuid) -> OrderResult<Option<OrderDetail>> {
        let store = self.store.read().await;
        Ok(store.orders.get(&id).map(|order| OrderDetail {
            order: order.clone(),
            items: store.items.get(&id).cloned().unwrap_or_default(),
        }))
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> OrderResult<Option<Order>> {
        let mut store = self.store.write().await;
        Ok(store
            .orders
            .get_mut(&id)
            .filter(|o| o.status == from)
            .map(|order| {
                order.status = to;
                order.updated_at = Utc::now();
                order.clone()
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::tests::product;
    use domain_cart::CartStatus;
    use rust_decimal::Decimal;

    async fn setup() -> (InMemoryOrderRepository, InMemoryCartRepository, Arc<InMemoryProductRepository>) {
        let carts = InMemoryCartRepository::new();
        let products = Arc::new(InMemoryProductRepository::new());
        let repo = InMemoryOrderRepository::new(carts.clone(), products.clone());
        (repo, carts, products)
    }

    #[tokio::test]
    async fn test_checkout_converts_cart() {
        let (repo, carts, products) = setup().await;
        let widget = product("Widget", 1000, true);
        products.insert(widget.clone()).await;
        carts
            .add_item("u1", widget.id, 3, widget.price)
            .await
            .unwrap();

        let detail = repo.checkout("u1", "USD", serde_json::json!({})).await.unwrap();
        assert_eq!(detail.order.total_amount, Decimal::new(3000, 2));
        assert_eq!(detail.items.len(), 1);

        assert!(carts.get_active_cart("u1").await.unwrap().is_none());
        let all = carts.carts_of("u1").await;
        assert_eq!(all[0].status, CartStatus::Converted);

        assert_eq!(repo.get(detail.order.id).await.unwrap(), Some(detail));
    }

    #[tokio::test]
    async fn test_checkout_without_cart_or_lines() {
        let (repo, carts, _) = setup().await;
        let err = repo.checkout("u1", "USD", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, OrderError::EmptyCart));

        carts.add_item("u1", Uuid::now_v7(), 1, Decimal::ONE).await.unwrap();
        carts.clear("u1").await.unwrap();
        let err = repo.checkout("u1", "USD", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, OrderError::EmptyCart));
    }

    #[tokio::test]
    async fn test_failed_checkout_leaves_cart_active() {
        let (repo, carts, products) = setup().await;
        let gone = product("Gone", 1000, false);
        products.insert(gone.clone()).await;
        carts.add_item("u1", gone.id, 1, gone.price).await.unwrap();

        let err = repo.checkout("u1", "USD", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, OrderError::Unavailable(_)));
        assert!(carts.get_active_cart("u1").await.unwrap().is_some());
        assert!(repo.list_for_user("u1", OrderFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_compare_and_set() {
        let (repo, carts, products) = setup().await;
        let widget = product("Widget", 1000, true);
        products.insert(widget.clone()).await;
        carts.add_item("u1", widget.id, 1, widget.price).await.unwrap();
        let order = repo.checkout("u1", "USD", serde_json::json!({})).await.unwrap().order;

        let paid = repo
            .update_status(order.id, OrderStatus::Pending, OrderStatus::Paid)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);

        // Stale expectation.
        assert!(
            repo.update_status(order.id, OrderStatus::Pending, OrderStatus::Cancelled)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (repo, carts, products) = setup().await;
        let widget = product("Widget", 1000, true);
        products.insert(widget.clone()).await;

        let mut numbers = Vec::new();
        for _ in 0..3 {
            carts.add_item("u1", widget.id, 1, widget.price).await.unwrap();
            let detail = repo.checkout("u1", "USD", serde_json::json!({})).await.unwrap();
            numbers.push(detail.order.id);
        }

        let listed: Vec<Uuid> = repo
            .list_for_user("u1", OrderFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        numbers.reverse();
        assert_eq!(listed, numbers);

        let page = repo
            .list_for_user(
                "u1",
                OrderFilter {
                    limit: Some(1),
                    offset: 1,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, listed[1]);
        assert!(repo.list_for_user("u2", OrderFilter::default()).await.unwrap().is_empty());
    }
}
