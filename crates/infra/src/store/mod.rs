//! Record store abstraction.
//!
//! The intake pipeline never talks to a database directly. It opens one
//! [`StoreTransaction`] per request through a [`RecordStore`] and performs
//! every lookup and write through it, then commits or rolls back explicitly.
//!
//! ## Lookups
//!
//! `find_*` methods return `Ok(None)` on a miss. Whether a miss is fatal is
//! decided by the caller (see [`crate::reconcile`]), never by the store.
//!
//! ## Ties
//!
//! When several records satisfy a lookup, the one with the lowest id wins.
//!
//! ## Implementations
//!
//! - [`InMemoryRecordStore`]: tests and local development
//! - [`PostgresRecordStore`]: production

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use intake_core::{CountryId, CurrencyId, InvoiceId, PartnerId, ProductId, StateId};
use intake_invoicing::{IntakeError, NewInvoice};
use intake_parties::{NewPartner, PartnerMatch};
use intake_products::NewProduct;

pub mod in_memory;
pub mod postgres;
mod schema;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;

/// Currencies every fresh store knows about: (code, full name, symbol).
pub const DEFAULT_CURRENCIES: &[(&str, &str, &str)] = &[
    ("USD", "US Dollar", "$"),
    ("EUR", "Euro", "€"),
    ("GBP", "Pound Sterling", "£"),
    ("SAR", "Saudi Riyal", "﷼"),
    ("AED", "UAE Dirham", "د.إ"),
    ("INR", "Indian Rupee", "₹"),
];

pub type StoreResult<T> = Result<T, StoreError>;

/// Record store failure.
///
/// These are infrastructure errors; they always surface to callers as
/// [`IntakeError::Unexpected`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write referenced a record that does not exist.
    #[error("referenced record does not exist: {0}")]
    ForeignKey(String),

    /// A write violated a uniqueness or check constraint.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// The backend failed (connection, I/O, SQL).
    #[error("database error: {0}")]
    Database(String),

    /// A stored row could not be read back.
    #[error("failed to decode row: {0}")]
    Decode(String),
}

impl From<StoreError> for IntakeError {
    fn from(value: StoreError) -> Self {
        IntakeError::unexpected(value.to_string())
    }
}

/// Factory for transaction scopes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Open a transaction scope. Writes made through it are invisible to
    /// other scopes until [`StoreTransaction::commit`].
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>>;
}

#[async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        (**self).begin().await
    }
}

/// One unit of work: lookups and creations per record kind.
///
/// Dropping a transaction without committing discards its writes.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn partner_exists(&mut self, id: PartnerId) -> StoreResult<bool>;

    /// Exact email OR exact mobile match.
    async fn find_partner(&mut self, criteria: &PartnerMatch) -> StoreResult<Option<PartnerId>>;

    async fn create_partner(&mut self, partner: &NewPartner) -> StoreResult<PartnerId>;

    /// Exact name match.
    async fn find_country(&mut self, name: &str) -> StoreResult<Option<CountryId>>;

    /// Exact name match, restricted to `country_id` when given.
    async fn find_state(
        &mut self,
        name: &str,
        country_id: Option<CountryId>,
    ) -> StoreResult<Option<StateId>>;

    async fn currency_exists(&mut self, id: CurrencyId) -> StoreResult<bool>;

    /// Exact match on currency code or full name.
    async fn find_currency(&mut self, code_or_name: &str) -> StoreResult<Option<CurrencyId>>;

    async fn product_exists(&mut self, id: ProductId) -> StoreResult<bool>;

    /// Exact name match.
    async fn find_product(&mut self, name: &str) -> StoreResult<Option<ProductId>>;

    async fn create_product(&mut self, product: &NewProduct) -> StoreResult<ProductId>;

    /// Persist an invoice with its lines. Every referenced record must exist.
    async fn create_invoice(&mut self, invoice: &NewInvoice) -> StoreResult<InvoiceId>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}
