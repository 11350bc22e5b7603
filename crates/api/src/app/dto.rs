use serde::Serialize;

use intake_core::RecordId;
use intake_invoicing::{IntakeReceipt, InvoiceTotals};

// -------------------------
// Response DTOs
// -------------------------

/// Success body of `POST /api/create_invoice`.
///
/// `customer_id` is only present when the request carried customer details.
#[derive(Debug, Serialize)]
pub struct CreateInvoiceResponse {
    pub status: &'static str,
    pub invoice_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    pub currency_code: Option<String>,
    #[serde(flatten)]
    pub totals: InvoiceTotals,
}

impl From<IntakeReceipt> for CreateInvoiceResponse {
    fn from(receipt: IntakeReceipt) -> Self {
        Self {
            status: "success",
            invoice_id: receipt.invoice_id.get(),
            customer_id: receipt.customer_id.map(RecordId::get),
            currency_code: receipt.currency_code,
            totals: receipt.totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::{InvoiceId, PartnerId};
    use serde_json::{Number, json};

    fn receipt(customer_id: Option<i64>) -> IntakeReceipt {
        IntakeReceipt {
            invoice_id: InvoiceId::from_raw(42),
            customer_id: customer_id.map(PartnerId::from_raw),
            currency_code: Some("USD".into()),
            totals: InvoiceTotals {
                total_amount_after_tax: Some(Number::from(100)),
                ..InvoiceTotals::default()
            },
        }
    }

    #[test]
    fn id_variant_response_has_no_customer_id() {
        let body = serde_json::to_value(CreateInvoiceResponse::from(receipt(None))).unwrap();
        assert_eq!(
            body,
            json!({
                "status": "success",
                "invoice_id": 42,
                "currency_code": "USD",
                "total_amount_before_tax": null,
                "total_tax": null,
                "total_discount": null,
                "total_amount_after_tax": 100,
                "total_payment": null
            })
        );
    }

    #[test]
    fn customer_variant_response_includes_customer_id() {
        let body = serde_json::to_value(CreateInvoiceResponse::from(receipt(Some(7)))).unwrap();
        assert_eq!(body["customer_id"], json!(7));
    }
}
