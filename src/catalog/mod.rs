//! # Product Catalog
//!
//! Products come from a user-supplied spreadsheet. The catalog is immutable
//! once loaded and replaced wholesale on the next upload.
//!
//! ## Modules
//!
//! - [`csv`]: delimiter detection and tolerant column matching
//! - [`sample`]: the downloadable CSV template and example products
//! - [`upload`]: file-type acceptance at the upload boundary

pub mod csv;
pub mod sample;
pub mod upload;

use serde::{Deserialize, Serialize};

pub use csv::parse_csv;

/// A product row. Identity key is `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub code: String,
    pub name: String,
    pub image_url: String,
}

impl Product {
    pub fn new(code: impl Into<String>, name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            image_url: image_url.into(),
        }
    }
}

/// Find a product by its code.
pub fn find_by_code<'a>(products: &'a [Product], code: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.code == code)
}

/// Filter products by a case-insensitive substring of the name or code.
///
/// An empty (or blank) query returns every product.
pub fn search<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let term = query.trim().to_lowercase();
    if term.is_empty() {
        return products.iter().collect();
    }
    products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&term) || p.code.to_lowercase().contains(&term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> Vec<Product> {
        sample::example_products()
    }

    #[test]
    fn test_find_by_code() {
        let products = products();
        let found = find_by_code(&products, "5678").unwrap();
        assert_eq!(found.name, "Skol Pilsen 1L");
        assert!(find_by_code(&products, "0000").is_none());
    }

    #[test]
    fn test_search_by_name_is_case_insensitive() {
        let products = products();
        let hits = search(&products, "SKOL");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "5678");
    }

    #[test]
    fn test_search_by_code() {
        let products = products();
        let hits = search(&products, "901");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Antarctica Original 600ml");
    }

    #[test]
    fn test_blank_search_returns_all() {
        let products = products();
        assert_eq!(search(&products, "  ").len(), 3);
    }
}
