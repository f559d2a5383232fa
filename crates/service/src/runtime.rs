//! Runtime wiring
//!
//! Builds the repositories from `configs::AppConfig`: picks the storage
//! backend, makes sure the data directory exists and initializes logging.

use std::sync::Arc;

use configs::{AppConfig, LogFormat, LoggingConfig, StorageBackend, StorageConfig};
use models::{cart::Cart, product::Product};
use tracing::info;

use crate::cart::CartRepository;
use crate::errors::ServiceError;
use crate::ids::IdPolicy;
use crate::product::ProductRepository;
use crate::storage::{JsonFileStore, MemoryStore, RecordStore};

/// Product and cart repositories sharing one product catalog.
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<ProductRepository>,
    pub carts: Arc<CartRepository>,
}

impl Repositories {
    pub fn from_stores(
        products: Arc<dyn RecordStore<Product>>,
        carts: Arc<dyn RecordStore<Cart>>,
        ids: IdPolicy,
    ) -> Self {
        let products = Arc::new(ProductRepository::new(products, ids));
        let carts = Arc::new(CartRepository::new(carts, products.clone(), ids));
        Self { products, carts }
    }

    /// Open the configured backend. The file backend creates `data_dir` when
    /// missing.
    pub async fn open(cfg: &StorageConfig) -> Result<Self, ServiceError> {
        let ids = IdPolicy::from(cfg.id_policy);
        let repos = match cfg.backend {
            StorageBackend::File => {
                common::env::ensure_data_dir(&cfg.data_dir)
                    .await
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                let products = JsonFileStore::<Product>::new(cfg.products_path()).await?;
                let carts = JsonFileStore::<Cart>::new(cfg.carts_path()).await?;
                if products.shares_location_with(&*carts) {
                    return Err(ServiceError::Storage(format!(
                        "products and carts resolve to one location: {}",
                        products.location()
                    )));
                }
                Self::from_stores(products, carts, ids)
            }
            StorageBackend::Memory => Self::from_stores(
                MemoryStore::<Product>::new("products"),
                MemoryStore::<Cart>::new("carts"),
                ids,
            ),
        };
        info!(
            backend = ?cfg.backend,
            id_policy = ?ids,
            products = %repos.products.location(),
            carts = %repos.carts.location(),
            "repositories ready"
        );
        Ok(repos)
    }
}

pub fn init_logging(cfg: &LoggingConfig) {
    match cfg.format {
        LogFormat::Compact => common::utils::logging::init_logging_default(),
        LogFormat::Json => common::utils::logging::init_logging_json(),
    }
}

/// Logging plus repositories from an already validated config.
pub async fn bootstrap(cfg: &AppConfig) -> anyhow::Result<Repositories> {
    init_logging(&cfg.logging);
    info!(event = "bootstrap", version = env!("CARGO_PKG_VERSION"), "opening collections");
    let repos = Repositories::open(&cfg.storage).await?;
    Ok(repos)
}
