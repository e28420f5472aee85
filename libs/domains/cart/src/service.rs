use domain_catalog::{Product, ProductRepository};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CartError, CartResult};
use crate::models::{
    AddToCart, CartItem, CartLine, CartProduct, CartView, MAX_LINE_QUANTITY, UpdateCartItem,
};
use crate::repository::CartRepository;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Cart operations for the authenticated user. Product lookups go through
/// the catalog repository.
pub struct CartService<C: CartRepository, P: ProductRepository> {
    carts: Arc<C>,
    products: Arc<P>,
    currency: String,
}

impl<C: CartRepository, P: ProductRepository> Clone for CartService<C, P> {
    fn clone(&self) -> Self {
        Self {
            carts: self.carts.clone(),
            products: self.products.clone(),
            currency: self.currency.clone(),
        }
    }
}

impl<C: CartRepository, P: ProductRepository> CartService<C, P> {
    pub fn new(carts: C, products: Arc<P>) -> Self {
        Self::from_shared(Arc::new(carts), products)
    }

    pub fn from_shared(carts: Arc<C>, products: Arc<P>) -> Self {
        Self {
            carts,
            products,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// The active cart with current product details. Lines whose product
    /// has since been deleted are left out of the view and the totals.
    pub async fn get_cart(&self, user_id: &str) -> CartResult<CartView> {
        let Some(cart) = self.carts.get_active_cart(user_id).await? else {
            return Ok(CartView::empty());
        };

        let items = self.carts.list_items(cart.id).await?;
        let ids = items.iter().map(|i| i.product_id).collect();
        let products: HashMap<Uuid, Product> = self
            .products
            .get_many(ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let lines = items
            .into_iter()
            .filter_map(|item| match products.get(&item.product_id) {
                Some(product) => Some(CartLine {
                    id: item.id,
                    product: CartProduct::from(product),
                    quantity: item.quantity,
                    price_at_time: item.price_at_time,
                    item_total: item.line_total(),
                }),
                None => {
                    tracing::warn!(
                        cart_id = %cart.id,
                        item_id = %item.id,
                        product_id = %item.product_id,
                        "Skipping cart line for missing product"
                    );
                    None
                }
            })
            .collect();

        Ok(CartView::new(cart, lines))
    }

    /// Adds a product at its current effective price.
    pub async fn add_item(&self, user_id: &str, input: AddToCart) -> CartResult<CartItem> {
        input
            .validate()
            .map_err(|e| CartError::Validation(e.to_string()))?;

        let product = self
            .products
            .get_by_id(input.product_id)
            .await?
            .ok_or(CartError::ProductNotFound(input.product_id))?;

        if !product.in_stock {
            return Err(CartError::OutOfStock);
        }

        let item = self
            .carts
            .add_item(user_id, product.id, input.quantity, product.effective_price())
            .await?;

        tracing::info!(
            user_id,
            product_id = %product.id,
            quantity = item.quantity,
            "Added product to cart"
        );
        Ok(item)
    }

    /// Sets a line's quantity. The price snapshot is not refreshed.
    pub async fn update_item(
        &self,
        user_id: &str,
        item_id: Uuid,
        input: UpdateCartItem,
    ) -> CartResult<CartItem> {
        if input.quantity <= 0 {
            return Err(CartError::Validation(
                "Quantity must be greater than 0".to_string(),
            ));
        }
        if input.quantity > MAX_LINE_QUANTITY {
            return Err(CartError::Validation(format!(
                "Quantity per item cannot exceed {}",
                MAX_LINE_QUANTITY
            )));
        }

        self.carts
            .update_item_quantity(user_id, item_id, input.quantity)
            .await?
            .ok_or(CartError::ItemNotFound(item_id))
    }

    pub async fn remove_item(&self, user_id: &str, item_id: Uuid) -> CartResult<()> {
        if self.carts.remove_item(user_id, item_id).await? {
            Ok(())
        } else {
            Err(CartError::ItemNotFound(item_id))
        }
    }

    /// Empties the active cart. Succeeds when there is nothing to clear.
    pub async fn clear(&self, user_id: &str) -> CartResult<u64> {
        let removed = self.carts.clear(user_id).await?;
        tracing::info!(user_id, removed, "Cleared cart");
        Ok(removed)
    }
}
