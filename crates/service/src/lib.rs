//! Data-access layer for the product catalog and shopping carts.
//! - `storage` loads and saves whole collections, one writer per location.
//! - `product` and `cart` repositories implement the entity operations.
//! - `runtime` wires repositories from configuration.

pub mod errors;
pub mod ids;
pub mod pagination;
pub mod storage;
pub mod product;
pub mod cart;
pub mod runtime;
#[cfg(test)]
pub mod test_support;

pub use cart::{CartRepository, CartView};
pub use errors::ServiceError;
pub use ids::IdPolicy;
pub use product::{ProductCatalog, ProductQuery, ProductRepository};
pub use runtime::Repositories;
