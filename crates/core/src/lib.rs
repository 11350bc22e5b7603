//! `intake-core` — shared building blocks for the invoice intake service.
//!
//! This crate contains **pure** primitives (no IO, no storage): typed record
//! identifiers, the domain error model, and helpers for reading loosely typed
//! JSON payload fields.

pub mod entity;
pub mod error;
pub mod id;
pub mod json;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CountryId, CurrencyId, InvoiceId, PartnerId, ProductId, RecordId, StateId};
