#![cfg(test)]
use std::path::PathBuf;

use models::product::ProductInput;

/// Valid creation input with a caller-chosen product code.
pub fn sample_input(code: &str) -> ProductInput {
    ProductInput {
        title: Some(format!("Product {code}")),
        description: Some("sample".into()),
        code: Some(code.into()),
        price: Some(10.0),
        stock: Some(5),
        category: Some("general".into()),
        ..Default::default()
    }
}

/// Fresh directory path under the system temp dir; not created.
pub fn temp_data_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{tag}_{}", uuid::Uuid::new_v4()))
}
