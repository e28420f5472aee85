use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, CreateCategory, CreateProduct, Product, ProductFilter, UpdateProduct};

/// Persistence for products and the categories they belong to.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fails with `Duplicate` when the slug or SKU is taken.
    async fn create(&self, input: CreateProduct) -> CatalogResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>>;

    async fn get_by_slug(&self, slug: &str) -> CatalogResult<Option<Product>>;

    /// Products among `ids`; unknown ids are skipped.
    async fn get_many(&self, ids: Vec<Uuid>) -> CatalogResult<Vec<Product>>;

    /// Newest first.
    async fn list(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>>;

    async fn update(&self, id: Uuid, input: UpdateProduct) -> CatalogResult<Product>;

    async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category>;

    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<Category>>;

    /// Ordered by name.
    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;
}

#[derive(Debug, Default)]
struct Store {
    products: HashMap<Uuid, Product>,
    categories: HashMap<Uuid, Category>,
}

/// In-memory implementation for development and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `product` as-is, replacing any product with the same id.
    pub async fn insert(&self, product: Product) {
        self.store.write().await.products.insert(product.id, product);
    }
}

fn taken(store: &Store, slug: &str, sku: &str, except: Option<Uuid>) -> Option<CatalogError> {
    let others = || store.products.values().filter(|p| Some(p.id) != except);
    if others().any(|p| p.slug == slug) {
        return Some(CatalogError::Duplicate(
            "A record with this slug already exists".to_string(),
        ));
    }
    if others().any(|p| p.sku == sku) {
        return Some(CatalogError::Duplicate(
            "A product with this SKU already exists".to_string(),
        ));
    }
    None
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: CreateProduct) -> CatalogResult<Product> {
        let mut store = self.store.write().await;
        if let Some(err) = taken(&store, &input.slug, &input.sku, None) {
            return Err(err);
        }

        let product = Product::new(input);
        store.products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, slug = %product.slug, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        Ok(self.store.read().await.products.get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> CatalogResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.values().find(|p| p.slug == slug).cloned())
    }

    async fn get_many(&self, ids: Vec<Uuid>) -> CatalogResult<Vec<Product>> {
        let store = self.store.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| store.products.get(id).cloned())
            .collect())
    }

    async fn list(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        let store = self.store.read().await;
        let mut products: Vec<Product> = store
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();

        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(products
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.page_size() as usize)
            .collect())
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> CatalogResult<Product> {
        let mut store = self.store.write().await;

        let mut product = store
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))?;
        product.apply_update(input);

        if let Some(err) = taken(&store, &product.slug, &product.sku, Some(id)) {
            return Err(err);
        }

        store.products.insert(id, product.clone());
        tracing::info!(product_id = %id, "Updated product");
        Ok(product)
    }

    async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        let mut store = self.store.write().await;
        if store.categories.values().any(|c| c.slug == input.slug) {
            return Err(CatalogError::Duplicate(
                "A record with this slug already exists".to_string(),
            ));
        }

        let category = Category::new(input);
        store.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<Category>> {
        Ok(self.store.read().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let store = self.store.read().await;
        let mut categories: Vec<Category> = store.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}
