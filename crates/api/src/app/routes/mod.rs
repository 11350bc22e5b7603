use axum::{Router, routing::post};

pub mod invoices;
pub mod system;

/// Router for the intake endpoints, mounted under `/api`.
pub fn router() -> Router {
    Router::new().route("/create_invoice", post(invoices::create_invoice))
}
