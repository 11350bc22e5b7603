//! The invoice intake pipeline: validate, reconcile, build, persist.

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use intake_core::RecordId;
use intake_core::json::{JsonObject, type_name};
use intake_invoicing::{
    IntakeError, IntakeReceipt, InvoiceRequest, build_invoice, validate_request,
};

use crate::reconcile::reconcile;
use crate::store::{RecordStore, StoreTransaction};

/// Entry point for invoice intake over a [`RecordStore`].
#[derive(Debug, Clone)]
pub struct InvoiceIntake<S> {
    store: S,
}

impl<S> InvoiceIntake<S>
where
    S: RecordStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create one invoice from a raw request body.
    ///
    /// Validation and value errors are returned before a transaction opens.
    /// Any later failure rolls the transaction back before returning.
    pub async fn create_invoice(&self, body: &Value) -> Result<IntakeReceipt, IntakeError> {
        let span = tracing::info_span!(
            "create_invoice",
            request_id = %Uuid::now_v7(),
        );

        async move {
            log_received_fields(body);

            let request = validate_request(body).inspect_err(|e| {
                tracing::warn!(error_kind = e.code(), error = %e, "invoice request rejected");
            })?;

            self.submit(&request, Utc::now().date_naive()).await
        }
        .instrument(span)
        .await
    }

    /// Persist an already validated request inside one transaction.
    pub async fn submit(
        &self,
        request: &InvoiceRequest,
        today: NaiveDate,
    ) -> Result<IntakeReceipt, IntakeError> {
        let mut tx = self.store.begin().await.inspect_err(|e| {
            tracing::error!(error = %e, "failed to open transaction");
        })?;

        match persist(tx.as_mut(), request, today).await {
            Ok(receipt) => {
                tx.commit().await.inspect_err(|e| {
                    tracing::error!(error = %e, "failed to commit invoice");
                })?;
                tracing::info!(
                    invoice_id = %receipt.invoice_id,
                    customer_id = receipt.customer_id.map(RecordId::get),
                    "invoice created"
                );
                Ok(receipt)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                if err.is_client_error() {
                    tracing::warn!(error_kind = err.code(), error = %err, "invoice intake failed");
                } else {
                    tracing::error!(error_kind = err.code(), error = %err, "invoice intake failed");
                }
                Err(err)
            }
        }
    }
}

async fn persist(
    tx: &mut dyn StoreTransaction,
    request: &InvoiceRequest,
    today: NaiveDate,
) -> Result<IntakeReceipt, IntakeError> {
    let reconciled = reconcile(tx, request).await?;
    let invoice = build_invoice(request, &reconciled.refs, today)?;
    let invoice_id = tx.create_invoice(&invoice).await?;

    Ok(IntakeReceipt {
        invoice_id,
        customer_id: reconciled.customer_id,
        currency_code: request.currency_code.clone(),
        totals: request.totals.clone(),
    })
}

fn log_received_fields(body: &Value) {
    match body.as_object() {
        Some(fields) => {
            let received = received_values(fields);
            let line_count = fields
                .get("invoice_lines")
                .and_then(Value::as_array)
                .map(Vec::len);
            tracing::info!(%received, line_count, "received invoice request");
        }
        None => tracing::info!(body_type = type_name(body), "received invoice request"),
    }
}

/// Top-level scalar fields of the body; nested values are summarised by type.
fn received_values(fields: &JsonObject) -> Value {
    let summary = fields
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Array(_) | Value::Object(_) => Value::String(format!("<{}>", type_name(value))),
                scalar => scalar.clone(),
            };
            (key.clone(), value)
        })
        .collect();
    Value::Object(summary)
}
