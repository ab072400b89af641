//! # Search View
//!
//! Name filter used by the counting list and the warehouse quick-entry grid.
//!
//! ## Rules
//! - Query is trimmed first, so `" Gold"` behaves like `"Gold"` and a
//!   whitespace-only query matches everything
//! - Otherwise a product matches when its name contains the query,
//!   compared case-insensitively
//! - Results keep the store's manual order
//!
//! The filter is a pure projection: it never mutates the store.

use crate::product::Product;

/// A prepared, case-folded search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameQuery(Option<String>);

impl NameQuery {
    pub fn new(query: &str) -> Self {
        let query = query.trim();
        if query.is_empty() {
            NameQuery(None)
        } else {
            NameQuery(Some(query.to_lowercase()))
        }
    }

    /// True for the empty query, which shows every product.
    pub fn is_all(&self) -> bool {
        self.0.is_none()
    }

    pub fn matches(&self, product: &Product) -> bool {
        match &self.0 {
            None => true,
            Some(needle) => product.name().to_lowercase().contains(needle.as_str()),
        }
    }
}

/// Filters `products` (already in display order) by `query`.
pub fn filter<'a, I>(products: I, query: &str) -> Vec<&'a Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    let query = NameQuery::new(query);
    products.into_iter().filter(|p| query.matches(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, barcode: &str, order: u32) -> Product {
        Product::new(name.to_string(), barcode.to_string(), order)
    }

    #[test]
    fn test_empty_query_matches_all() {
        let q = NameQuery::new("   ");
        assert!(q.is_all());
        assert!(q.matches(&product("Esse Change", "1", 1)));
    }

    #[test]
    fn test_case_insensitive_substring() {
        let items = vec![
            product("Marlboro Gold", "1", 1),
            product("Esse Change", "2", 2),
            product("marlboro Red", "3", 3),
        ];

        let names: Vec<&str> = filter(&items, "MARL").iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Marlboro Gold", "marlboro Red"]);

        assert!(filter(&items, "xyz-no-match").is_empty());
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let items = vec![product("Marlboro Gold", "1", 1), product("Gold Seal", "2", 2)];
        assert_eq!(filter(&items, " Gold"), filter(&items, "Gold"));
        assert_eq!(filter(&items, "ro Gold ").len(), 1);
    }

    #[test]
    fn test_non_ascii_names() {
        let items = vec![product("말보루 골드", "1", 1), product("에쎄 수 0.5", "2", 2)];
        let hits = filter(&items, "골드");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name(), "말보루 골드");
    }
}
