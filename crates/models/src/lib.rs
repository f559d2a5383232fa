//! Domain records for the catalog and cart collections.
//! - Plain serde structs; persistence lives in the `service` crate.
//! - Input validation helpers return `ModelError::Validation`.

pub mod errors;
pub mod record;
pub mod product;
pub mod cart;

#[cfg(test)]
mod tests;
