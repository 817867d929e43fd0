use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::LedgerError;

/// HTTP face of `LedgerError`: `{"error": code, "message": text}`.
#[derive(Debug)]
pub struct ApiError(pub LedgerError);

impl<E: Into<LedgerError>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LedgerError::ProductNotFound(_)
            | LedgerError::BarcodeNotFound(_)
            | LedgerError::OrderNotFound(_)
            | LedgerError::UserNotFound(_)
            | LedgerError::AccountNotFound(_)
            | LedgerError::EventNotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Validation(_)
            | LedgerError::InvalidInput(_)
            | LedgerError::EmptyCart
            | LedgerError::IncompleteCartLine
            | LedgerError::OutOfStock(_)
            | LedgerError::Sheet(_) => StatusCode::BAD_REQUEST,
            LedgerError::EmailTaken(_) | LedgerError::InvalidTransition { .. } => StatusCode::CONFLICT,
            LedgerError::ProtectedAccount => StatusCode::FORBIDDEN,
            LedgerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            LedgerError::SuggestionUnavailable => StatusCode::BAD_GATEWAY,
            LedgerError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match &self.0 {
            LedgerError::ProductNotFound(_) => "product_not_found",
            LedgerError::BarcodeNotFound(_) => "barcode_not_found",
            LedgerError::OrderNotFound(_) => "order_not_found",
            LedgerError::UserNotFound(_) => "user_not_found",
            LedgerError::AccountNotFound(_) => "account_not_found",
            LedgerError::EventNotFound(_) => "event_not_found",
            LedgerError::Validation(_) => "validation_failed",
            LedgerError::InvalidInput(_) => "invalid_input",
            LedgerError::EmptyCart => "empty_cart",
            LedgerError::IncompleteCartLine => "incomplete_cart_line",
            LedgerError::OutOfStock(_) => "out_of_stock",
            LedgerError::Sheet(_) => "invalid_sheet",
            LedgerError::EmailTaken(_) => "email_taken",
            LedgerError::InvalidTransition { .. } => "invalid_transition",
            LedgerError::ProtectedAccount => "protected_account",
            LedgerError::InvalidCredentials => "invalid_credentials",
            LedgerError::SuggestionUnavailable => "suggestion_unavailable",
            LedgerError::Session(_) => "session_storage",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let mut body = json!({ "error": self.code(), "message": self.0.to_string() });
        if let LedgerError::Validation(errors) = &self.0 {
            body["fields"] = serde_json::to_value(errors).unwrap_or_default();
        }
        (status, Json(body)).into_response()
    }
}
