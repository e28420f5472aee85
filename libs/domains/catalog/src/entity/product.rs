use crate::models::{CreateProduct, Product};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(unique)]
    pub sku: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub sale_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub in_stock: bool,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary")]
    pub attributes: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub specifications: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub featured_image: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            sku: model.sku,
            description: model.description,
            price: model.price,
            sale_price: model.sale_price,
            stock_quantity: model.stock_quantity,
            in_stock: model.in_stock,
            category_id: model.category_id,
            brand_id: model.brand_id,
            attributes: model.attributes,
            specifications: model.specifications,
            // Tags are free-form; anything that is not a string array reads as empty.
            tags: serde_json::from_value(model.tags).unwrap_or_default(),
            featured_image: model.featured_image,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<CreateProduct> for ActiveModel {
    fn from(input: CreateProduct) -> Self {
        let now = chrono::Utc::now();
        ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            slug: Set(input.slug),
            sku: Set(input.sku),
            description: Set(input.description),
            price: Set(input.price),
            sale_price: Set(input.sale_price),
            stock_quantity: Set(input.stock_quantity),
            in_stock: Set(input.in_stock),
            category_id: Set(input.category_id),
            brand_id: Set(input.brand_id),
            attributes: Set(input.attributes),
            specifications: Set(input.specifications),
            tags: Set(serde_json::Value::from(input.tags)),
            featured_image: Set(input.featured_image),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }
}
