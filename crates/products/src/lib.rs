//! Products domain module.
//!
//! Products referenced by invoice lines. The intake service only ever creates
//! service-type products; other types exist so stored catalogues round-trip.

pub mod product;

pub use product::{NewProduct, Product, ProductType};
