use chrono::{DateTime, Utc};
use domain_catalog::Product;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{DeriveActiveEnum, EnumIter, sea_query::StringLen};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Upper bound for a single line, keeps quantity sums inside `i32`.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CartStatus {
    /// The one mutable cart per user.
    #[sea_orm(string_value = "active")]
    Active,
    /// Checked out into an order.
    #[sea_orm(string_value = "converted")]
    Converted,
    #[sea_orm(string_value = "abandoned")]
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: String,
    pub status: CartStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new_active(user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            status: CartStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price when the line was last added to.
    #[schema(value_type = f64)]
    pub price_at_time: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.price_at_time * Decimal::from(self.quantity)
    }
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct AddToCart {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = MAX_LINE_QUANTITY))]
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

/// Quantity must be positive; removing a line is `DELETE /cart/item/{id}`.
/// The bound is checked by the service.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateCartItem {
    pub quantity: i32,
}

/// Product fields shown next to a cart line, priced at today's effective price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartProduct {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub featured_image: Option<String>,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub in_stock: bool,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            featured_image: product.featured_image.clone(),
            price: product.effective_price(),
            in_stock: product.in_stock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub product: CartProduct,
    pub quantity: i32,
    #[schema(value_type = f64)]
    pub price_at_time: Decimal,
    /// `price_at_time × quantity`
    #[schema(value_type = f64)]
    pub item_total: Decimal,
}

/// A user's active cart with totals. `cart` is `None` when there is no
/// active cart, in which case the totals are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartView {
    pub cart: Option<Cart>,
    pub items: Vec<CartLine>,
    #[schema(value_type = f64)]
    pub total_amount: Decimal,
    pub total_items: i64,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            cart: None,
            items: Vec::new(),
            total_amount: Decimal::ZERO,
            total_items: 0,
        }
    }

    pub fn new(cart: Cart, items: Vec<CartLine>) -> Self {
        let total_amount = round_money(items.iter().map(|line| line.item_total).sum());
        let total_items = items.iter().map(|line| i64::from(line.quantity)).sum();
        Self {
            cart: Some(cart),
            items,
            total_amount,
            total_items,
        }
    }
}

/// Two decimal places, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// HTTP response bodies

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItemSummary {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    #[schema(value_type = f64)]
    pub price: Decimal,
}

impl From<CartItem> for CartItemSummary {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price_at_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItemResponse {
    pub message: String,
    pub success: bool,
    pub cart_item: CartItemSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartSummary {
    #[schema(value_type = f64)]
    pub total_amount: Decimal,
    pub total_items: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartResponse {
    pub cart: Option<Cart>,
    pub items: Vec<CartLine>,
    pub summary: CartSummary,
}

impl CartResponse {
    pub fn new(view: CartView, currency: &str) -> Self {
        Self {
            cart: view.cart,
            items: view.items,
            summary: CartSummary {
                total_amount: view.total_amount,
                total_items: view.total_items,
                currency: currency.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn line(price: &str, quantity: i32) -> CartLine {
        let price_at_time = dec(price);
        CartLine {
            id: Uuid::now_v7(),
            product: CartProduct {
                id: Uuid::now_v7(),
                name: "p".into(),
                slug: "p".into(),
                featured_image: None,
                price: price_at_time,
                in_stock: true,
            },
            quantity,
            price_at_time,
            item_total: price_at_time * Decimal::from(quantity),
        }
    }

    #[test]
    fn test_totals() {
        let view = CartView::new(
            Cart::new_active("u1"),
            vec![line("19.99", 3), line("0.333", 1)],
        );
        // 59.97 + 0.333 = 60.303
        assert_eq!(view.total_amount, dec("60.30"));
        assert_eq!(view.total_items, 4);
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec("2.345")), dec("2.35"));
        assert_eq!(round_money(dec("2.344")), dec("2.34"));
        assert_eq!(round_money(dec("-2.345")), dec("-2.35"));
    }

    #[test]
    fn test_empty_view_shape() {
        let json = serde_json::to_value(CartView::empty()).unwrap();
        assert_eq!(json["cart"], serde_json::Value::Null);
        assert_eq!(json["items"], serde_json::json!([]));
        assert_eq!(json["total_amount"], serde_json::json!(0.0));
        assert_eq!(json["total_items"], 0);
    }

    #[test]
    fn test_add_defaults_to_one() {
        let add: AddToCart =
            serde_json::from_str(&format!(r#"{{"product_id": "{}"}}"#, Uuid::nil())).unwrap();
        assert_eq!(add.quantity, 1);
        assert!(add.validate().is_ok());

        let zero = AddToCart {
            product_id: Uuid::nil(),
            quantity: 0,
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(CartStatus::Active.to_string(), "active");
        assert_eq!("converted".parse::<CartStatus>().unwrap(), CartStatus::Converted);
    }
}
