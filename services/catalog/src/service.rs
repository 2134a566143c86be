//! Catalog service logic

use crate::models::{NewProduct, Product};
use crate::repository::ProductRepository;
use common::error::ServiceResult;
use common::id;
use tracing::info;

/// Largest page a list or search call will serve
const MAX_PAGE: u64 = 100;
/// Default and ceiling for suggestion sizes
const DEFAULT_SUGGEST_SIZE: u64 = 5;
const MAX_SUGGEST_SIZE: u64 = 25;

#[derive(Clone)]
pub struct CatalogService {
    repo: ProductRepository,
}

impl CatalogService {
    pub fn new(repo: ProductRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, new_product: &NewProduct) -> ServiceResult<Product> {
        let product = Product {
            id: id::generate(),
            name: new_product.name.clone(),
            description: new_product.description.clone(),
            price: new_product.price,
            stock: new_product.stock,
            sold: 0,
            out_of_stock: new_product.stock <= 0,
        };
        self.repo.create(&product).await?;
        info!("product created: {}", product.id);
        Ok(product)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Product> {
        self.repo.get_by_id(id).await
    }

    /// List, batch-lookup, or search depending on which filters are present
    pub async fn list(
        &self,
        skip: u64,
        take: u64,
        ids: Option<Vec<String>>,
        query: Option<String>,
    ) -> ServiceResult<Vec<Product>> {
        let take = if take == 0 || take > MAX_PAGE {
            MAX_PAGE
        } else {
            take
        };

        if let Some(ids) = ids.filter(|ids| !ids.is_empty()) {
            return self.repo.list_with_ids(&ids).await;
        }
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            return self.repo.search(&query, skip, take).await;
        }
        self.repo.list(skip, take).await
    }

    /// Atomic stock decrement + sold increment for a reservation (or the
    /// reverse for a compensation); false means the guard rejected it
    pub async fn update_stock_and_sold(&self, id: &str, quantity: i32) -> ServiceResult<bool> {
        let applied = self.repo.update_stock_and_sold(id, quantity).await?;
        if !applied {
            info!("stock update rejected for product {} (qty {})", id, quantity);
        }
        Ok(applied)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.repo.soft_delete(id).await
    }

    pub async fn restock(&self, id: &str, new_stock: i32) -> ServiceResult<()> {
        info!("restocking product {} to {}", id, new_stock);
        self.repo.restock(id, new_stock).await
    }

    /// Prefix suggestions; `use_ai` selects an alternative ranking backend,
    /// which this index serves from the same store
    pub async fn suggest(
        &self,
        prefix: &str,
        size: Option<u64>,
        _use_ai: bool,
    ) -> ServiceResult<Vec<Product>> {
        let size = size
            .unwrap_or(DEFAULT_SUGGEST_SIZE)
            .clamp(1, MAX_SUGGEST_SIZE);
        self.repo.suggest(prefix, size).await
    }
}
