//! Pure cart → order conversion rules, shared by every repository.

use chrono::{DateTime, Utc};
use domain_cart::CartItem;
use domain_cart::models::round_money;
use domain_catalog::Product;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::{Order, OrderDetail, OrderItem, OrderStatus};

/// `ORD-YYYYMMDD-XXXXXXXX`, eight random uppercase hex digits.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("ORD-{}-{}", now.format("%Y%m%d"), random[..8].to_uppercase())
}

/// Order and lines ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlan {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl From<OrderPlan> for OrderDetail {
    fn from(plan: OrderPlan) -> Self {
        Self {
            order: plan.order,
            items: plan.items,
        }
    }
}

/// Builds the order for a cart's lines.
///
/// Fails with `EmptyCart` when there are no lines and with `Unavailable`
/// when a line's product is gone or not in stock. Line totals use the
/// cart's price snapshot, not the current catalog price.
pub fn plan_order(
    user_id: &str,
    currency: &str,
    metadata: serde_json::Value,
    lines: &[CartItem],
    products: &HashMap<Uuid, Product>,
    now: DateTime<Utc>,
) -> OrderResult<OrderPlan> {
    if lines.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let order_id = Uuid::now_v7();
    let mut items = Vec::with_capacity(lines.len());
    let mut total = Decimal::ZERO;

    for line in lines {
        let product = products
            .get(&line.product_id)
            .ok_or_else(|| OrderError::Unavailable(line.product_id.to_string()))?;
        if !product.in_stock {
            return Err(OrderError::Unavailable(product.name.clone()));
        }

        let line_total = round_money(line.line_total());
        total += line_total;
        items.push(OrderItem {
            id: Uuid::now_v7(),
            order_id,
            product_id: Some(product.id),
            product_name: product.name.clone(),
            unit_price: line.price_at_time,
            quantity: line.quantity,
            line_total,
            created_at: now,
        });
    }

    let order = Order {
        id: order_id,
        order_number: generate_order_number(now),
        user_id: user_id.to_string(),
        status: OrderStatus::Pending,
        total_amount: round_money(total),
        currency: currency.to_string(),
        metadata,
        created_at: now,
        updated_at: now,
    };

    Ok(OrderPlan { order, items })
}
