pub mod query;
pub mod repository;

use async_trait::async_trait;
use models::{product::Product, record::RecordId};

use crate::errors::ServiceError;

pub use query::{ProductQuery, SortOrder};
pub use repository::ProductRepository;

/// Read access to the catalog, as needed by other repositories.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Product>, ServiceError>;
    async fn get_by_id(&self, id: RecordId) -> Result<Option<Product>, ServiceError>;
}
