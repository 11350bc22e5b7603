use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use intake_core::{CurrencyId, Entity, InvoiceId, PartnerId, ProductId};

use crate::error::IntakeError;
use crate::request::{InvoiceRequest, InvoiceTotals};

/// Accounting move type. The intake service only issues customer invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    OutInvoice,
}

impl MoveType {
    pub fn as_str(self) -> &'static str {
        match self {
            MoveType::OutInvoice => "out_invoice",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoiceLine {
    pub product_id: ProductId,
    pub quantity: f64,
    pub price_unit: f64,
}

/// Field set for an invoice that does not exist yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub partner_id: PartnerId,
    pub currency_id: CurrencyId,
    pub move_type: MoveType,
    pub invoice_date: NaiveDate,
    pub lines: Vec<NewInvoiceLine>,
    pub currency_code: Option<String>,
    pub totals: InvoiceTotals,
    pub payment_reference: Option<String>,
    pub payment_method: Option<String>,
}

/// A persisted invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    #[serde(flatten)]
    pub fields: NewInvoice,
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> InvoiceId {
        self.id
    }
}

/// Record ids the reconciler resolved for one request.
///
/// `product_ids` is parallel to the request's lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReferences {
    pub partner_id: PartnerId,
    pub currency_id: CurrencyId,
    pub product_ids: Vec<ProductId>,
}

/// Assemble the invoice to persist.
///
/// Totals are copied from the request; they are never recomputed from lines.
pub fn build_invoice(
    request: &InvoiceRequest,
    refs: &ResolvedReferences,
    today: NaiveDate,
) -> Result<NewInvoice, IntakeError> {
    if refs.product_ids.len() != request.lines.len() {
        return Err(IntakeError::unexpected(format!(
            "resolved {} products for {} invoice lines",
            refs.product_ids.len(),
            request.lines.len()
        )));
    }

    let lines = request
        .lines
        .iter()
        .zip(&refs.product_ids)
        .map(|(line, product_id)| NewInvoiceLine {
            product_id: *product_id,
            quantity: line.quantity,
            price_unit: line.price_unit,
        })
        .collect();

    Ok(NewInvoice {
        partner_id: refs.partner_id,
        currency_id: refs.currency_id,
        move_type: MoveType::OutInvoice,
        invoice_date: request.invoice_date.unwrap_or(today),
        lines,
        currency_code: request.currency_code.clone(),
        totals: request.totals.clone(),
        payment_reference: request.payment_reference.clone(),
        payment_method: request.payment_method.clone(),
    })
}
