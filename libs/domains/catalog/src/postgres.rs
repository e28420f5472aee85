use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::entity::{category, product};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, CreateCategory, CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;

#[derive(Clone)]
pub struct PgProductRepository {
    products: BaseRepository<product::Entity>,
    categories: BaseRepository<category::Entity>,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            products: BaseRepository::new(db.clone()),
            categories: BaseRepository::new(db),
        }
    }

    fn db(&self) -> &DatabaseConnection {
        self.products.db()
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: CreateProduct) -> CatalogResult<Product> {
        let active_model: product::ActiveModel = input.into();
        let model = self.products.insert(active_model).await?;

        tracing::info!(product_id = %model.id, slug = %model.slug, "Created product");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        let model = self.products.find_by_id(id).await?;
        Ok(model.map(Into::into))
    }

    async fn get_by_slug(&self, slug: &str) -> CatalogResult<Option<Product>> {
        let model = product::Entity::find()
            .filter(product::Column::Slug.eq(slug))
            .one(self.db())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn get_many(&self, ids: Vec<Uuid>) -> CatalogResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(self.db())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        let mut query = product::Entity::find();

        if let Some(category_id) = filter.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(in_stock) = filter.in_stock {
            query = query.filter(product::Column::InStock.eq(in_stock));
        }
        if let Some(term) = filter.search_term() {
            query = query.filter(Expr::cust_with_values(
                "products.name ILIKE $1",
                [format!("%{}%", escape_like(term))],
            ));
        }

        let models = query
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id)
            .limit(filter.page_size())
            .offset(filter.offset)
            .all(self.db())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> CatalogResult<Product> {
        let model = self
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))?;

        let mut product: Product = model.clone().into();
        product.apply_update(input);

        let mut active = model.into_active_model();
        active.name = Set(product.name);
        active.slug = Set(product.slug);
        active.sku = Set(product.sku);
        active.description = Set(product.description);
        active.price = Set(product.price);
        active.sale_price = Set(product.sale_price);
        active.stock_quantity = Set(product.stock_quantity);
        active.in_stock = Set(product.in_stock);
        active.category_id = Set(product.category_id);
        active.attributes = Set(product.attributes);
        active.specifications = Set(product.specifications);
        active.tags = Set(serde_json::Value::from(product.tags));
        active.featured_image = Set(product.featured_image);
        active.updated_at = Set(product.updated_at.into());

        let updated = self.products.update(active).await?;
        tracing::info!(product_id = %id, "Updated product");
        Ok(updated.into())
    }

    async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        let active_model: category::ActiveModel = input.into();
        let model = self.categories.insert(active_model).await?;

        tracing::info!(category_id = %model.id, slug = %model.slug, "Created category");
        Ok(model.into())
    }

    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<Category>> {
        Ok(self.categories.find_by_id(id).await?.map(Into::into))
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let models = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(self.db())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}

/// Escapes `%`, `_` and `\` so user input matches literally inside ILIKE.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
