use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DeriveActiveEnum, EnumIter, sea_query::StringLen};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

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
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "fulfilled")]
    Fulfilled,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// `pending → paid → fulfilled`, and `pending | paid → cancelled`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Paid, Fulfilled) | (Pending, Cancelled) | (Paid, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Fulfilled | OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    /// `ORD-YYYYMMDD-XXXXXXXX`
    pub order_number: String,
    pub user_id: String,
    pub status: OrderStatus,
    #[schema(value_type = f64)]
    pub total_amount: Decimal,
    pub currency: String,
    /// Free-form correlation data, e.g. a manufacturing job reference.
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    /// `None` once the product has been deleted from the catalog.
    pub product_id: Option<Uuid>,
    pub product_name: String,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    pub quantity: i32,
    #[schema(value_type = f64)]
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

fn metadata_is_object(metadata: &serde_json::Value) -> Result<(), ValidationError> {
    if metadata.is_object() {
        Ok(())
    } else {
        Err(ValidationError::new("metadata_not_object")
            .with_message("metadata must be a JSON object".into()))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[validate(custom(function = "metadata_is_object"))]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

impl CheckoutRequest {
    pub fn metadata(self) -> serde_json::Value {
        self.metadata
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct OrderFilter {
    /// Page size, 20 by default, at most 100.
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

impl OrderFilter {
    pub fn page_size(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn test_transitions() {
        let allowed = [
            (Pending, Paid),
            (Paid, Fulfilled),
            (Pending, Cancelled),
            (Paid, Cancelled),
        ];
        for from in [Pending, Paid, Fulfilled, Cancelled] {
            for to in [Pending, Paid, Fulfilled, Cancelled] {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
        assert!(Fulfilled.is_terminal());
        assert!(!Paid.is_terminal());
    }

    #[test]
    fn test_checkout_metadata() {
        assert_eq!(CheckoutRequest::default().metadata(), serde_json::json!({}));

        let bad = CheckoutRequest {
            metadata: Some(serde_json::json!([1, 2])),
        };
        assert!(bad.validate().is_err());

        let good = CheckoutRequest {
            metadata: Some(serde_json::json!({"job": "mfg-42"})),
        };
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_detail_is_flat() {
        let now = Utc::now();
        let detail = OrderDetail {
            order: Order {
                id: Uuid::nil(),
                order_number: "ORD-20250101-ABCDEF12".into(),
                user_id: "u1".into(),
                status: Pending,
                total_amount: Decimal::new(1000, 2),
                currency: "USD".into(),
                metadata: serde_json::json!({}),
                created_at: now,
                updated_at: now,
            },
            items: Vec::new(),
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["order_number"], "ORD-20250101-ABCDEF12");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["items"], serde_json::json!([]));
    }

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(OrderFilter::default().page_size(), 20);
        let zero = OrderFilter {
            limit: Some(0),
            offset: 0,
        };
        assert_eq!(zero.page_size(), 1);
    }
}
