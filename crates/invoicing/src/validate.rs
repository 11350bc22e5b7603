//! Request validation.
//!
//! Two passes over the raw JSON body:
//!
//! 1. **Structural checks**, in a fixed order, stopping at the first failure:
//!    partner identity, `invoice_lines`, `currency_id`, then each line.
//!    Failures are [`IntakeError::Validation`].
//! 2. **Coercion** of the accepted fields into typed values (ids, dates,
//!    totals). Failures are [`IntakeError::InvalidValue`].
//!
//! Nothing here touches storage, so a rejected request never causes a write.

use chrono::NaiveDate;
use serde_json::Value;

use intake_core::json::{JsonObject, given, is_numeric, optional_number, optional_text, record_id};
use intake_core::DomainError;
use intake_parties::CustomerDetails;

use crate::error::IntakeError;
use crate::request::{
    CurrencyRef, InvoiceRequest, InvoiceTotals, PartnerRef, ProductRef, RequestLine,
};

pub const MISSING_PARTNER: &str = "Missing \"partner_id\"";
pub const MISSING_CUSTOMER_NAME: &str = "Missing customer name (\"FirstName\"/\"LastName\")";
pub const INVALID_LINES: &str = "\"invoice_lines\" must be a non-empty list";
pub const MISSING_CURRENCY: &str = "Missing \"currency_id\"";
pub const LINE_NOT_OBJECT: &str = "Each invoice line must be a dictionary";
pub const LINE_WITHOUT_PRODUCT: &str =
    "Each invoice line must have a \"product_id\" or \"product_name\"";
pub const QUANTITY_NOT_NUMBER: &str = "Quantity must be a number";
pub const PRICE_NOT_NUMBER: &str = "Price unit must be a number";

const DEFAULT_QUANTITY: f64 = 1.0;
const DEFAULT_PRICE_UNIT: f64 = 0.0;

/// Validate a raw request body into an [`InvoiceRequest`].
pub fn validate_request(body: &Value) -> Result<InvoiceRequest, IntakeError> {
    let obj = body
        .as_object()
        .ok_or_else(|| IntakeError::validation("Request body must be a JSON object"))?;

    let partner_by_id = given(obj, "partner_id").is_some();
    if !partner_by_id && !has_customer_name(obj) {
        // Callers of the id variant never send customer fields; name the field
        // they most likely forgot.
        let msg = if obj.contains_key("FirstName") || obj.contains_key("LastName") {
            MISSING_CUSTOMER_NAME
        } else {
            MISSING_PARTNER
        };
        return Err(IntakeError::validation(msg));
    }

    let lines = match obj.get("invoice_lines") {
        Some(Value::Array(lines)) if !lines.is_empty() => lines,
        _ => return Err(IntakeError::validation(INVALID_LINES)),
    };

    if given(obj, "currency_id").is_none() {
        return Err(IntakeError::validation(MISSING_CURRENCY));
    }

    for line in lines {
        check_line(line)?;
    }

    coerce(obj, partner_by_id, lines)
}

fn has_customer_name(obj: &JsonObject) -> bool {
    ["FirstName", "LastName"].iter().any(|key| {
        matches!(obj.get(*key), Some(Value::String(s)) if !s.trim().is_empty())
    })
}

fn check_line(line: &Value) -> Result<(), IntakeError> {
    let line = line
        .as_object()
        .ok_or_else(|| IntakeError::validation(LINE_NOT_OBJECT))?;

    let has_product = given(line, "product_id").is_some()
        || matches!(line.get("product_name"), Some(Value::String(s)) if !s.trim().is_empty());
    if !has_product {
        return Err(IntakeError::validation(LINE_WITHOUT_PRODUCT));
    }

    if line.get("quantity").is_some_and(|q| !is_numeric(q)) {
        return Err(IntakeError::validation(QUANTITY_NOT_NUMBER));
    }
    if line.get("price_unit").is_some_and(|p| !is_numeric(p)) {
        return Err(IntakeError::validation(PRICE_NOT_NUMBER));
    }
    Ok(())
}

fn coerce(
    obj: &JsonObject,
    partner_by_id: bool,
    lines: &[Value],
) -> Result<InvoiceRequest, IntakeError> {
    let partner = match given(obj, "partner_id") {
        Some(id) if partner_by_id => PartnerRef::Id(record_id(id, "partner_id")?),
        _ => PartnerRef::Customer(CustomerDetails::from_json(obj)?),
    };

    let lines = lines
        .iter()
        .filter_map(Value::as_object)
        .map(coerce_line)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InvoiceRequest {
        partner,
        lines,
        currency: coerce_currency(obj)?,
        currency_code: optional_text(obj, "currency_code")?,
        totals: InvoiceTotals {
            total_amount_before_tax: optional_number(obj, "total_amount_before_tax")?,
            total_tax: optional_number(obj, "total_tax")?,
            total_discount: optional_number(obj, "total_discount")?,
            total_amount_after_tax: optional_number(obj, "total_amount_after_tax")?,
            total_payment: optional_number(obj, "total_payment")?,
        },
        payment_reference: optional_text(obj, "payment_reference")?,
        invoice_date: optional_text(obj, "invoice_date")?
            .map(|raw| parse_invoice_date(&raw))
            .transpose()?,
        payment_method: optional_text(obj, "payment_method")?,
    })
}

fn coerce_line(line: &JsonObject) -> Result<RequestLine, IntakeError> {
    let product = match given(line, "product_id") {
        Some(id) => ProductRef::Id(record_id(id, "product_id")?),
        None => match optional_text(line, "product_name")? {
            Some(name) => ProductRef::Name(name),
            None => return Err(IntakeError::validation(LINE_WITHOUT_PRODUCT)),
        },
    };

    Ok(RequestLine {
        product,
        quantity: number_or(line, "quantity", DEFAULT_QUANTITY),
        price_unit: number_or(line, "price_unit", DEFAULT_PRICE_UNIT),
    })
}

fn number_or(line: &JsonObject, key: &str, default: f64) -> f64 {
    line.get(key).and_then(Value::as_f64).unwrap_or(default)
}

fn coerce_currency(obj: &JsonObject) -> Result<CurrencyRef, IntakeError> {
    match obj.get("currency_id") {
        Some(v @ Value::Number(_)) => Ok(CurrencyRef::Id(record_id(v, "currency_id")?)),
        Some(v @ Value::String(raw)) if is_integer_text(raw) => {
            Ok(CurrencyRef::Id(record_id(v, "currency_id")?))
        }
        Some(Value::String(code)) => Ok(CurrencyRef::Code(code.trim().to_string())),
        Some(other) => Err(DomainError::invalid_value(format!(
            "\"currency_id\" must be an id or a currency code, got {other}"
        ))
        .into()),
        None => Err(IntakeError::validation(MISSING_CURRENCY)),
    }
}

/// Digits only, as sent by callers that stringify currency ids.
fn is_integer_text(raw: &str) -> bool {
    let raw = raw.trim();
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

fn parse_invoice_date(raw: &str) -> Result<NaiveDate, IntakeError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
        DomainError::invalid_value(format!(
            "\"invoice_date\" must be a YYYY-MM-DD date, got \"{raw}\": {e}"
        ))
        .into()
    })
}
