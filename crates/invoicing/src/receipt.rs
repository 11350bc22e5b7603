use intake_core::{InvoiceId, PartnerId};

use crate::request::InvoiceTotals;

/// Outcome of a successful intake call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeReceipt {
    pub invoice_id: InvoiceId,
    /// Set when the partner was matched or created from customer details.
    pub customer_id: Option<PartnerId>,
    pub currency_code: Option<String>,
    pub totals: InvoiceTotals,
}
