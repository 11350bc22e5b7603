//! Invoicing domain module.
//!
//! Turns an inbound invoice payload into a validated [`InvoiceRequest`], and a
//! validated request plus reconciled record ids into a [`NewInvoice`] ready to
//! persist. Pure logic: no IO, no HTTP, no storage.

pub mod currency;
pub mod error;
pub mod invoice;
pub mod receipt;
pub mod request;
pub mod validate;

pub use currency::Currency;
pub use error::IntakeError;
pub use invoice::{
    Invoice, MoveType, NewInvoice, NewInvoiceLine, ResolvedReferences, build_invoice,
};
pub use receipt::IntakeReceipt;
pub use request::{CurrencyRef, InvoiceRequest, InvoiceTotals, PartnerRef, ProductRef, RequestLine};
pub use validate::validate_request;
