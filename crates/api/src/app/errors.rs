use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use orgadmin_auth::abac::PolicyValidationError;
use orgadmin_infra::policy_store::PolicyStoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn validation_error_to_response(err: PolicyValidationError) -> axum::response::Response {
    match err {
        PolicyValidationError::Malformed(_) | PolicyValidationError::UnsupportedVersion(_) => {
            json_error(StatusCode::BAD_REQUEST, "malformed_policy", err.to_string())
        }
        _ => json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_policy", err.to_string()),
    }
}

pub fn store_error_to_response(err: PolicyStoreError) -> axum::response::Response {
    match err {
        PolicyStoreError::Validation(e) => validation_error_to_response(e),
        PolicyStoreError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        PolicyStoreError::Storage(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

/// Body rejections are reported in the same JSON shape as everything else.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn invalid_id(what: &'static str) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id"))
}
