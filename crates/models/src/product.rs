use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;
use crate::record::{Record, RecordId};

/// Catalog entry as stored in the products collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub code: String,
    pub price: f64,
    #[serde(default = "default_status")]
    pub status: bool,
    pub stock: u32,
    pub category: String,
    #[serde(default)]
    pub thumbnails: Vec<String>,
    /// Fields this model does not know about, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_status() -> bool { true }

impl Record for Product {
    fn id(&self) -> RecordId { self.id }
}

/// Raw creation input. Every field is optional so that missing fields surface
/// as validation errors instead of deserialization failures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub status: Option<bool>,
    pub thumbnails: Option<Vec<String>>,
}

/// Validated creation input; becomes a `Product` once an id is assigned.
#[derive(Clone, Debug, PartialEq)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub code: String,
    pub price: f64,
    pub stock: u32,
    pub category: String,
    pub status: bool,
    pub thumbnails: Vec<String>,
}

impl NewProduct {
    pub fn into_product(self, id: RecordId) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            code: self.code,
            price: self.price,
            status: self.status,
            stock: self.stock,
            category: self.category,
            thumbnails: self.thumbnails,
            extra: Map::new(),
        }
    }
}

pub fn validate_text(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), ModelError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ModelError::validation("price must be a number greater than 0"));
    }
    Ok(())
}

pub fn validate_stock(stock: i64) -> Result<u32, ModelError> {
    u32::try_from(stock).map_err(|_| ModelError::validation("stock must be a non-negative integer"))
}

fn required<T>(field: &str, value: Option<T>) -> Result<T, ModelError> {
    value.ok_or_else(|| ModelError::validation(format!("{field} is required")))
}

fn required_text(field: &str, value: Option<String>) -> Result<String, ModelError> {
    let v = required(field, value)?;
    validate_text(field, &v)?;
    Ok(v)
}

impl ProductInput {
    /// Parse from an arbitrary JSON value. Type mismatches (for example
    /// `thumbnails` holding something other than strings) are reported as
    /// validation errors.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ModelError> {
        serde_json::from_value(value).map_err(|e| ModelError::validation(e.to_string()))
    }

    /// All fields except `status` and `thumbnails` are mandatory.
    pub fn validate(self) -> Result<NewProduct, ModelError> {
        let title = required_text("title", self.title)?;
        let description = required_text("description", self.description)?;
        let code = required_text("code", self.code)?;
        let price = required("price", self.price)?;
        validate_price(price)?;
        let stock = validate_stock(required("stock", self.stock)?)?;
        let category = required_text("category", self.category)?;
        Ok(NewProduct {
            title,
            description,
            code,
            price,
            stock,
            category,
            status: self.status.unwrap_or(true),
            thumbnails: self.thumbnails.unwrap_or_default(),
        })
    }
}

/// Partial update. There is no `id` field, so an `id` key in incoming JSON is
/// ignored and the stored id is always kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub status: Option<bool>,
    pub thumbnails: Option<Vec<String>>,
}

impl ProductPatch {
    pub fn from_json(value: serde_json::Value) -> Result<Self, ModelError> {
        serde_json::from_value(value).map_err(|e| ModelError::validation(e.to_string()))
    }

    pub fn is_empty(&self) -> bool { *self == Self::default() }

    /// Check provided fields with the same rules as creation.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("code", &self.code),
            ("category", &self.category),
        ] {
            if let Some(v) = value { validate_text(field, v)?; }
        }
        if let Some(p) = self.price { validate_price(p)?; }
        if let Some(s) = self.stock { validate_stock(s)?; }
        Ok(())
    }

    /// Merge the provided fields over `product`. Call `validate` first.
    pub fn apply(self, product: &mut Product) -> Result<(), ModelError> {
        if let Some(v) = self.title { product.title = v; }
        if let Some(v) = self.description { product.description = v; }
        if let Some(v) = self.code { product.code = v; }
        if let Some(v) = self.price { product.price = v; }
        if let Some(v) = self.stock { product.stock = validate_stock(v)?; }
        if let Some(v) = self.category { product.category = v; }
        if let Some(v) = self.status { product.status = v; }
        if let Some(v) = self.thumbnails { product.thumbnails = v; }
        Ok(())
    }
}
