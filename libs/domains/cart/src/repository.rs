use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CartError, CartResult};
use crate::models::{Cart, CartItem, CartStatus, MAX_LINE_QUANTITY};

/// Carts and their lines, always addressed through the owning user so a
/// caller can never touch another user's cart.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn get_active_cart(&self, user_id: &str) -> CartResult<Option<Cart>>;

    /// Oldest line first.
    async fn list_items(&self, cart_id: Uuid) -> CartResult<Vec<CartItem>>;

    /// Adds `quantity` of a product to the user's active cart, creating the
    /// cart on first use. An existing line is incremented and its price
    /// snapshot replaced with `unit_price`. Atomic against concurrent adds.
    async fn add_item(
        &self,
        user_id: &str,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
    ) -> CartResult<CartItem>;

    /// `None` when the line is not in the user's active cart.
    async fn update_item_quantity(
        &self,
        user_id: &str,
        item_id: Uuid,
        quantity: i32,
    ) -> CartResult<Option<CartItem>>;

    /// `false` when the line is not in the user's active cart.
    async fn remove_item(&self, user_id: &str, item_id: Uuid) -> CartResult<bool>;

    /// Deletes every line of the active cart; the cart itself stays.
    async fn clear(&self, user_id: &str) -> CartResult<u64>;
}

pub(crate) fn quantity_overflow() -> CartError {
    CartError::Validation(format!(
        "Quantity per item cannot exceed {}",
        MAX_LINE_QUANTITY
    ))
}

#[derive(Debug, Default)]
struct Store {
    carts: HashMap<Uuid, Cart>,
    items: HashMap<Uuid, CartItem>,
}

impl Store {
    fn active_cart(&self, user_id: &str) -> Option<&Cart> {
        self.carts
            .values()
            .find(|c| c.user_id == user_id && c.status == CartStatus::Active)
    }

    fn active_cart_id(&self, user_id: &str) -> Option<Uuid> {
        self.active_cart(user_id).map(|c| c.id)
    }

    fn items_of(&self, cart_id: Uuid) -> Vec<CartItem> {
        let mut items: Vec<CartItem> = self
            .items
            .values()
            .filter(|i| i.cart_id == cart_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        items
    }
}

/// In-memory implementation for development and tests. Every mutation runs
/// under a single write lock.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCartRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the cart `converted` if it is still active and its lines are
    /// exactly `expected`. Used by the in-memory checkout.
    pub async fn convert_if_unchanged(&self, cart_id: Uuid, expected: &[CartItem]) -> bool {
        let mut store = self.store.write().await;
        if store.items_of(cart_id) != expected {
            return false;
        }
        match store.carts.get_mut(&cart_id) {
            Some(cart) if cart.status == CartStatus::Active => {
                cart.status = CartStatus::Converted;
                cart.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    /// Every cart ever created for `user_id`, in any status.
    pub async fn carts_of(&self, user_id: &str) -> Vec<Cart> {
        let store = self.store.read().await;
        store
            .carts
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn get_active_cart(&self, user_id: &str) -> CartResult<Option<Cart>> {
        Ok(self.store.read().await.active_cart(user_id).cloned())
    }

    async fn list_items(&self, cart_id: Uuid) -> CartResult<Vec<CartItem>> {
        Ok(self.store.read().await.items_of(cart_id))
    }

    async fn add_item(
        &self,
        user_id: &str,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
    ) -> CartResult<CartItem> {
        let mut store = self.store.write().await;
        let now = Utc::now();

        let cart_id = match store.active_cart_id(user_id) {
            Some(id) => id,
            None => {
                let cart = Cart::new_active(user_id);
                let id = cart.id;
                store.carts.insert(id, cart);
                tracing::info!(cart_id = %id, user_id, "Created cart");
                id
            }
        };

        let existing = store
            .items
            .values_mut()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id);

        let item = match existing {
            Some(item) => {
                let total = item
                    .quantity
                    .checked_add(quantity)
                    .filter(|q| *q <= MAX_LINE_QUANTITY)
                    .ok_or_else(quantity_overflow)?;
                item.quantity = total;
                item.price_at_time = unit_price;
                item.updated_at = now;
                item.clone()
            }
            None => {
                let item = CartItem {
                    id: Uuid::now_v7(),
                    cart_id,
                    product_id,
                    quantity,
                    price_at_time: unit_price,
                    created_at: now,
                    updated_at: now,
                };
                store.items.insert(item.id, item.clone());
                item
            }
        };

        if let Some(cart) = store.carts.get_mut(&cart_id) {
            cart.updated_at = now;
        }
        Ok(item)
    }

    async fn update_item_quantity(
        &self,
        user_id: &str,
        item_id: Uuid,
        quantity: i32,
    ) -> CartResult<Option<CartItem>> {
        let mut store = self.store.write().await;
        let Some(cart_id) = store.active_cart_id(user_id) else {
            return Ok(None);
        };

        Ok(store
            .items
            .get_mut(&item_id)
            .filter(|i| i.cart_id == cart_id)
            .map(|item| {
                item.quantity = quantity;
                item.updated_at = Utc::now();
                item.clone()
            }))
    }

    async fn remove_item(&self, user_id: &str, item_id: Uuid) -> CartResult<bool> {
        let mut store = self.store.write().await;
        let Some(cart_id) = store.active_cart_id(user_id) else {
            return Ok(false);
        };

        let owned = store.items.get(&item_id).is_some_and(|i| i.cart_id == cart_id);
        if owned {
            store.items.remove(&item_id);
        }
        Ok(owned)
    }

    async fn clear(&self, user_id: &str) -> CartResult<u64> {
        let mut store = self.store.write().await;
        let Some(cart_id) = store.active_cart_id(user_id) else {
            return Ok(0);
        };

        let before = store.items.len();
        store.items.retain(|_, i| i.cart_id != cart_id);
        Ok((before - store.items.len()) as u64)
    }
}
