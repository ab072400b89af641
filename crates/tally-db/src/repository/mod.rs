//! # Repository Module
//!
//! SQL lives here and nowhere else.
//!
//! ```text
//! InventoryStore ──snapshot──► ProductRepository::save_all ──► products table
//! InventoryStore ◄──restore─── ProductRepository::load_all ◄── products table
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product snapshot load/save

pub mod product;
