use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{OrderError, OrderResult};
use crate::models::{CheckoutRequest, Order, OrderDetail, OrderFilter, UpdateOrderStatus};
use crate::repository::OrderRepository;

pub struct OrderService<R: OrderRepository> {
    repository: Arc<R>,
    currency: String,
}

impl<R: OrderRepository> Clone for OrderService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            currency: self.currency.clone(),
        }
    }
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repository: R, currency: impl Into<String>) -> Self {
        Self {
            repository: Arc::new(repository),
            currency: currency.into(),
        }
    }

    pub async fn checkout(&self, user_id: &str, input: CheckoutRequest) -> OrderResult<OrderDetail> {
        input
            .validate()
            .map_err(|e| OrderError::Validation(e.to_string()))?;

        self.repository
            .checkout(user_id, &self.currency, input.metadata())
            .await
    }

    pub async fn list_orders(&self, user_id: &str, filter: OrderFilter) -> OrderResult<Vec<Order>> {
        self.repository.list_for_user(user_id, filter).await
    }

    /// Orders owned by someone else are reported as not found.
    pub async fn get_order(&self, user_id: &str, id: Uuid) -> OrderResult<OrderDetail> {
        self.repository
            .get(id)
            .await?
            .filter(|detail| detail.order.user_id == user_id)
            .ok_or(OrderError::OrderNotFound(id))
    }

    /// Admin status change along the allowed transitions.
    pub async fn update_status(&self, id: Uuid, input: UpdateOrderStatus) -> OrderResult<Order> {
        let current = self
            .repository
            .get(id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))?
            .order;

        if !current.status.can_transition_to(input.status) {
            return Err(OrderError::InvalidTransition {
                from: current.status,
                to: input.status,
            });
        }

        let updated = self
            .repository
            .update_status(id, current.status, input.status)
            .await?
            .ok_or_else(|| {
                OrderError::Conflict("Order status changed concurrently, please retry".to_string())
            })?;

        tracing::info!(
            order_id = %id,
            from = %current.status,
            to = %updated.status,
            "Order status changed"
        );
        Ok(updated)
    }
}
