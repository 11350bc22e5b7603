use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use intake_invoicing::IntakeError;

pub fn intake_error_to_response(err: IntakeError) -> axum::response::Response {
    let status = match &err {
        IntakeError::Validation(_) => StatusCode::BAD_REQUEST,
        IntakeError::InvalidValue(_) | IntakeError::UnresolvedReference(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        IntakeError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    json_error(status, err.code(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "status": "error",
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
