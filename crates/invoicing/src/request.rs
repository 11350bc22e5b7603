//! Validated invoice request model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use intake_core::{CurrencyId, PartnerId, ProductId};
use intake_parties::CustomerDetails;

/// Who the invoice is for.
#[derive(Debug, Clone, PartialEq)]
pub enum PartnerRef {
    /// An existing partner, by id.
    Id(PartnerId),
    /// A customer to match by email/mobile, or create.
    Customer(CustomerDetails),
}

/// Which product a line bills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductRef {
    Id(ProductId),
    /// Matched by exact name, created as a service product when absent.
    Name(String),
}

/// Invoice currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencyRef {
    Id(CurrencyId),
    /// Matched by exact code or name.
    Code(String),
}

impl core::fmt::Display for CurrencyRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CurrencyRef::Id(id) => write!(f, "id {id}"),
            CurrencyRef::Code(code) => write!(f, "\"{code}\""),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestLine {
    pub product: ProductRef,
    pub quantity: f64,
    pub price_unit: f64,
}

/// Caller-computed totals, stored and echoed exactly as supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub total_amount_before_tax: Option<Number>,
    pub total_tax: Option<Number>,
    pub total_discount: Option<Number>,
    pub total_amount_after_tax: Option<Number>,
    pub total_payment: Option<Number>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRequest {
    pub partner: PartnerRef,
    pub lines: Vec<RequestLine>,
    pub currency: CurrencyRef,
    pub currency_code: Option<String>,
    pub totals: InvoiceTotals,
    pub payment_reference: Option<String>,
    /// `None` means "today" at build time.
    pub invoice_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
}

impl InvoiceRequest {
    /// Whether the partner has to be matched or created from customer details.
    pub fn creates_customer(&self) -> bool {
        matches!(self.partner, PartnerRef::Customer(_))
    }
}
