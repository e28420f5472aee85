use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, CreateCategory, CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;

/// Catalog reads for shoppers and writes for administrators.
pub struct CatalogService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> Clone for CatalogService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<R: ProductRepository> CatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self::from_shared(Arc::new(repository))
    }

    /// Shares one repository with other services (cart, checkout).
    pub fn from_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> Arc<R> {
        self.repository.clone()
    }

    pub async fn list_products(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        self.repository.list(filter).await
    }

    pub async fn get_product(&self, id: Uuid) -> CatalogResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))
    }

    pub async fn get_product_by_slug(&self, slug: &str) -> CatalogResult<Product> {
        self.repository
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| CatalogError::ProductNotFound(slug.to_string()))
    }

    pub async fn create_product(&self, input: CreateProduct) -> CatalogResult<Product> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        if let Some(category_id) = input.category_id {
            self.ensure_category(category_id).await?;
        }

        self.repository.create(input).await
    }

    /// Applies a partial update; the resulting sale price must still not
    /// exceed the resulting list price.
    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> CatalogResult<Product> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let current = self.get_product(id).await?;

        let price = input.price.unwrap_or(current.price);
        let sale_price = match input.sale_price {
            Some(sale_price) => sale_price,
            None => current.sale_price,
        };
        if let Some(sale) = sale_price {
            if sale.is_sign_negative() && !sale.is_zero() {
                return Err(CatalogError::Validation(
                    "sale_price must not be negative".to_string(),
                ));
            }
            if sale > price {
                return Err(CatalogError::Validation(
                    "sale_price must not exceed price".to_string(),
                ));
            }
        }

        if let Some(Some(category_id)) = input.category_id {
            self.ensure_category(category_id).await?;
        }

        self.repository.update(id, input).await
    }

    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.repository.list_categories().await
    }

    pub async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        if let Some(parent_id) = input.parent_id {
            self.ensure_category(parent_id).await?;
        }

        self.repository.create_category(input).await
    }

    async fn ensure_category(&self, id: Uuid) -> CatalogResult<()> {
        match self.repository.get_category(id).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::Validation(format!(
                "Category {} does not exist",
                id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::{create_input, dec};
    use crate::repository::{InMemoryProductRepository, MockProductRepository};
    use mockall::predicate::eq;

    fn service() -> CatalogService<InMemoryProductRepository> {
        CatalogService::new(InMemoryProductRepository::new())
    }

    #[tokio::test]
    async fn test_get_missing_product_is_not_found() {
        let mut repo = MockProductRepository::new();
        let id = Uuid::now_v7();
        repo.expect_get_by_id()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(None));

        let err = CatalogService::new(repo).get_product(id).await.unwrap_err();
        assert!(matches!(err, CatalogError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_product_never_reaches_repository() {
        let mut repo = MockProductRepository::new();
        repo.expect_create().never();

        let mut input = create_input("widget");
        input.sale_price = Some(dec("99"));
        let err = CatalogService::new(repo).create_product(input).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_with_unknown_category() {
        let mut input = create_input("widget");
        input.category_id = Some(Uuid::now_v7());
        let err = service().create_product(input).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_checks_resulting_prices() {
        let service = service();
        let mut input = create_input("widget");
        input.sale_price = Some(dec("8.00"));
        let product = service.create_product(input).await.unwrap();

        // Lowering price below the existing sale price is rejected.
        let err = service
            .update_product(
                product.id,
                UpdateProduct {
                    price: Some(dec("5.00")),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        // Clearing the sale price in the same update makes it valid.
        let updated = service
            .update_product(
                product.id,
                UpdateProduct {
                    price: Some(dec("5.00")),
                    sale_price: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.effective_price(), dec("5.00"));
    }

    #[tokio::test]
    async fn test_category_parent_must_exist() {
        let service = service();
        let root = service
            .create_category(CreateCategory {
                name: "Printing".into(),
                slug: "printing".into(),
                description: None,
                parent_id: None,
            })
            .await
            .unwrap();

        let child = service
            .create_category(CreateCategory {
                name: "Filament".into(),
                slug: "filament".into(),
                description: None,
                parent_id: Some(root.id),
            })
            .await
            .unwrap();
        assert_eq!(child.parent_id, Some(root.id));

        let err = service
            .create_category(CreateCategory {
                name: "Orphan".into(),
                slug: "orphan".into(),
                description: None,
                parent_id: Some(Uuid::now_v7()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }
}
