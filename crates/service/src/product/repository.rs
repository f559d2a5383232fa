use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use models::product::{Product, ProductInput, ProductPatch};
use models::record::{find_by_id, find_by_id_mut, remove_by_id, RecordId};

use crate::errors::ServiceError;
use crate::ids::IdPolicy;
use crate::pagination::Page;
use crate::product::{ProductCatalog, ProductQuery};
use crate::storage::{modify, RecordStore};

/// Catalog operations over a product collection.
///
/// Every call loads the whole collection; mutations run under the store's
/// location lock and persist the whole collection.
pub struct ProductRepository {
    store: Arc<dyn RecordStore<Product>>,
    ids: IdPolicy,
}

impl ProductRepository {
    pub fn new(store: Arc<dyn RecordStore<Product>>, ids: IdPolicy) -> Self { Self { store, ids } }

    pub fn location(&self) -> &str { self.store.location() }

    /// Full collection, stored order.
    pub async fn get_all(&self) -> Result<Vec<Product>, ServiceError> {
        self.store.load().await
    }

    pub async fn list(&self, query: &ProductQuery) -> Result<Page<Product>, ServiceError> {
        let page = query.apply(self.store.load().await?);
        Ok(page)
    }

    /// `None` when no product has this id.
    pub async fn get_by_id(&self, id: RecordId) -> Result<Option<Product>, ServiceError> {
        let products = self.store.load().await?;
        Ok(find_by_id(&products, id).cloned())
    }

    /// Validate, assign a fresh id and append.
    #[instrument(skip(self, input), fields(location = %self.store.location()))]
    pub async fn add(&self, input: ProductInput) -> Result<Product, ServiceError> {
        let draft = input.validate()?;
        let ids = self.ids;
        let created = modify(self.store.as_ref(), move |products| {
            let product = draft.into_product(ids.next_id(products));
            products.push(product.clone());
            Ok(product)
        })
        .await?;
        info!(id = created.id, code = %created.code, "product added");
        Ok(created)
    }

    /// Merge `patch` over the stored product. The id never changes. Returns
    /// `None` if the id is unknown; the collection is persisted either way.
    #[instrument(skip(self, patch), fields(location = %self.store.location()))]
    pub async fn update(&self, id: RecordId, patch: ProductPatch) -> Result<Option<Product>, ServiceError> {
        patch.validate()?;
        let updated = modify(self.store.as_ref(), move |products| {
            match find_by_id_mut(products, id) {
                Some(product) => {
                    patch.apply(product)?;
                    Ok(Some(product.clone()))
                }
                None => Ok(None),
            }
        })
        .await?;
        match &updated {
            Some(_) => info!(id, "product updated"),
            None => info!(id, "product update skipped: not found"),
        }
        Ok(updated)
    }

    /// Remove the product; returns whether it existed. Deleting an unknown id
    /// is a no-op.
    #[instrument(skip(self), fields(location = %self.store.location()))]
    pub async fn delete(&self, id: RecordId) -> Result<bool, ServiceError> {
        let existed = modify(self.store.as_ref(), move |products| Ok(remove_by_id(products, id))).await?;
        info!(id, existed, "product delete");
        Ok(existed)
    }
}

#[async_trait]
impl ProductCatalog for ProductRepository {
    async fn get_all(&self) -> Result<Vec<Product>, ServiceError> { self.get_all().await }
    async fn get_by_id(&self, id: RecordId) -> Result<Option<Product>, ServiceError> { self.get_by_id(id).await }
}
