use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Lowercase words joined by single hyphens.
pub static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 100;

fn positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_positive() && !price.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("price_not_positive").with_message("must be greater than 0".into()))
    }
}

fn non_negative_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        Err(ValidationError::new("price_negative").with_message("must not be negative".into()))
    } else {
        Ok(())
    }
}

fn sale_not_above_price(input: &CreateProduct) -> Result<(), ValidationError> {
    match input.sale_price {
        Some(sale) if sale > input.price => Err(ValidationError::new("sale_price_above_price")
            .with_message("sale_price must not exceed price".into())),
        _ => Ok(()),
    }
}

/// `Some(None)` for an explicit `null`, `None` when the field is absent.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: Option<String>,
    #[schema(value_type = f64, example = 19.99)]
    pub price: Decimal,
    #[schema(value_type = Option<f64>, example = 14.99)]
    pub sale_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub in_stock: bool,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    #[schema(value_type = Object)]
    pub attributes: serde_json::Value,
    #[schema(value_type = Object)]
    pub specifications: serde_json::Value,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Sale price when one is set, otherwise the list price.
    pub fn effective_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }

    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            slug: input.slug,
            sku: input.sku,
            description: input.description,
            price: input.price,
            sale_price: input.sale_price,
            stock_quantity: input.stock_quantity,
            in_stock: input.in_stock,
            category_id: input.category_id,
            brand_id: input.brand_id,
            attributes: input.attributes,
            specifications: input.specifications,
            tags: input.tags,
            featured_image: input.featured_image,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(slug) = update.slug {
            self.slug = slug;
        }
        if let Some(sku) = update.sku {
            self.sku = sku;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(sale_price) = update.sale_price {
            self.sale_price = sale_price;
        }
        if let Some(stock_quantity) = update.stock_quantity {
            self.stock_quantity = stock_quantity;
        }
        if let Some(in_stock) = update.in_stock {
            self.in_stock = in_stock;
        }
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        if let Some(attributes) = update.attributes {
            self.attributes = attributes;
        }
        if let Some(specifications) = update.specifications {
            self.specifications = specifications;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(featured_image) = update.featured_image {
            self.featured_image = featured_image;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[validate(schema(function = "sale_not_above_price", skip_on_field_errors = true))]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 200), regex(path = *SLUG))]
    pub slug: String,
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    pub description: Option<String>,
    #[validate(custom(function = "positive_price"))]
    #[schema(value_type = f64, example = 19.99)]
    pub price: Decimal,
    #[validate(custom(function = "non_negative_price"))]
    #[schema(value_type = Option<f64>)]
    pub sale_price: Option<Decimal>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub attributes: serde_json::Value,
    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub specifications: serde_json::Value,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(length(max = 500))]
    pub featured_image: Option<String>,
}

fn default_true() -> bool {
    true
}

fn empty_object() -> serde_json::Value {
    serde_json::json!({})
}

/// Partial update. For nullable columns an explicit `null` clears the value
/// and an absent field leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 200), regex(path = *SLUG))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[validate(custom(function = "positive_price"))]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<f64>)]
    pub sale_price: Option<Option<Decimal>>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    pub in_stock: Option<bool>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
    #[schema(value_type = Option<Object>)]
    pub attributes: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub specifications: Option<serde_json::Value>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<String>)]
    pub featured_image: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub in_stock: Option<bool>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    /// Page size, 50 by default, at most 100.
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

impl ProductFilter {
    pub fn page_size(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn matches(&self, product: &Product) -> bool {
        if self.category_id.is_some_and(|c| product.category_id != Some(c)) {
            return false;
        }
        if self.in_stock.is_some_and(|s| product.in_stock != s) {
            return false;
        }
        match self.search_term() {
            Some(term) => product.name.to_lowercase().contains(&term.to_lowercase()),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(input: CreateCategory) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            slug: input.slug,
            description: input.description,
            parent_id: input.parent_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 120), regex(path = *SLUG))]
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}
