use serde::Deserialize;

use models::product::Product;

use crate::pagination::{Page, Pagination};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Listing options: filter, sort by price, then slice.
///
/// Without `page`, `limit` just truncates (all items when absent). With
/// `page`, `limit` is the page size (default 10, clamped to 1..=100).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub sort: Option<SortOrder>,
    pub category: Option<String>,
    pub status: Option<bool>,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if !product.category.eq_ignore_ascii_case(category.trim()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if product.status != status {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, products: Vec<Product>) -> Page<Product> {
        let mut items: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();
        match self.sort {
            Some(SortOrder::Asc) => items.sort_by(|a, b| a.price.total_cmp(&b.price)),
            Some(SortOrder::Desc) => items.sort_by(|a, b| b.price.total_cmp(&a.price)),
            None => {}
        }
        let total = items.len();
        let items = match self.page {
            Some(page) => {
                let per_page = self.limit.unwrap_or(Pagination::default().per_page);
                Pagination { page, per_page }.slice(items)
            }
            None => match self.limit {
                Some(limit) => items.into_iter().take(limit as usize).collect(),
                None => items,
            },
        };
        Page { items, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: u64, price: f64, category: &str, status: bool) -> Product {
        Product {
            id,
            title: format!("p{id}"),
            description: "d".into(),
            code: format!("c{id}"),
            price,
            status,
            stock: 1,
            category: category.into(),
            thumbnails: Vec::new(),
            extra: Default::default(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, 30.0, "books", true),
            product(2, 10.0, "games", true),
            product(3, 20.0, "Books", false),
            product(4, 10.0, "books", true),
        ]
    }

    fn ids(page: &Page<Product>) -> Vec<u64> { page.items.iter().map(|p| p.id).collect() }

    #[test]
    fn default_query_returns_everything_in_order() {
        let page = ProductQuery::default().apply(catalog());
        assert_eq!(ids(&page), vec![1, 2, 3, 4]);
        assert_eq!(page.total, 4);
    }

    #[test]
    fn limit_without_page_truncates() {
        let q = ProductQuery { limit: Some(2), ..Default::default() };
        let page = q.apply(catalog());
        assert_eq!(ids(&page), vec![1, 2]);
        assert_eq!(page.total, 4);
    }

    #[test]
    fn filters_by_category_and_status() {
        let q = ProductQuery { category: Some("BOOKS".into()), ..Default::default() };
        assert_eq!(ids(&q.apply(catalog())), vec![1, 3, 4]);

        let q = ProductQuery { category: Some("books".into()), status: Some(true), ..Default::default() };
        assert_eq!(ids(&q.apply(catalog())), vec![1, 4]);
    }

    #[test]
    fn sort_by_price_is_stable() {
        let q = ProductQuery { sort: Some(SortOrder::Asc), ..Default::default() };
        assert_eq!(ids(&q.apply(catalog())), vec![2, 4, 3, 1]);
        let q = ProductQuery { sort: Some(SortOrder::Desc), ..Default::default() };
        assert_eq!(ids(&q.apply(catalog())), vec![1, 3, 2, 4]);
    }

    #[test]
    fn page_uses_limit_as_page_size() {
        let q = ProductQuery { page: Some(2), limit: Some(3), ..Default::default() };
        let page = q.apply(catalog());
        assert_eq!(ids(&page), vec![4]);
        assert_eq!(page.total, 4);

        let q = ProductQuery { page: Some(1), ..Default::default() };
        assert_eq!(q.apply(catalog()).items.len(), 4);
    }
}
