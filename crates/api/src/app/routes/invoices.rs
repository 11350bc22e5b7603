use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `POST /api/create_invoice`
///
/// Accepts both request shapes: existing `partner_id`/`product_id`
/// references, or customer details with `product_name` lines.
pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "unreadable request body");
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("Request body must be a JSON object: {}", rejection.body_text()),
            );
        }
    };

    match services.intake().create_invoice(&body).await {
        Ok(receipt) => (StatusCode::OK, Json(dto::CreateInvoiceResponse::from(receipt))).into_response(),
        Err(e) => errors::intake_error_to_response(e),
    }
}
