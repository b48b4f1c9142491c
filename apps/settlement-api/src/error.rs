//! Unified error handling for the HTTP surface.
//!
//! Every handler returns [`ApiError`] and lets `?` collect the domain
//! taxonomy from the services; the [`IntoResponse`] impl is the single
//! place where domain errors become statuses.
//!
//! ## Status Mapping
//!
//! | Error | Status | Code |
//! |-------|--------|------|
//! | InsufficientStock | 400 | `insufficient-stock` |
//! | InsufficientTopUp | 400 | `insufficient-top-up` |
//! | Validation | 400 | `validation` |
//! | StockNotFound | 404 | `not-found` |
//! | NotAuthorized | 403 | `not-authorized` |
//! | NothingToPay | 409 | `nothing-to-pay` |
//! | DuplicateOrder | 409 | `duplicate-order` |
//! | Storage | 500 | `storage` |
//!
//! A retried order normally never reaches the `duplicate-order` arm: the
//! settlement flow folds replays into a 200 receipt with `alreadySettled`
//! set. The arm exists for callers that hit the recorder directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use stockroom_core::error::CoreError;
use stockroom_settlement::SettlementError;

/// Body of every non-2xx response.
///
/// ```json
/// {
///   "code": "insufficient-stock",
///   "message": "Insufficient stock for stk-1: available 3, requested 5"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// What a handler failure turns into on the wire.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] SettlementError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(SettlementError::Domain(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError(err) = self;
        let (status, code, message) = match &err {
            SettlementError::Domain(domain) => {
                let (status, code) = match domain {
                    CoreError::InsufficientStock { .. } => {
                        (StatusCode::BAD_REQUEST, "insufficient-stock")
                    }
                    CoreError::InsufficientTopUp { .. } => {
                        (StatusCode::BAD_REQUEST, "insufficient-top-up")
                    }
                    CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
                    CoreError::StockNotFound { .. } => (StatusCode::NOT_FOUND, "not-found"),
                    CoreError::NotAuthorized { .. } => (StatusCode::FORBIDDEN, "not-authorized"),
                    CoreError::DuplicateOrder(_) => (StatusCode::CONFLICT, "duplicate-order"),
                    CoreError::NothingToPay { .. } => (StatusCode::CONFLICT, "nothing-to-pay"),
                };
                (status, code, domain.to_string())
            }

            // Infrastructure detail stays in the logs; clients get a stable
            // generic message.
            SettlementError::Storage(detail) => {
                error!(error = %detail, "storage error surfaced to client");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage",
                    "Storage backend unavailable".to_string(),
                )
            }
        };

        let body = Json(ErrorBody {
            code: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Convenience alias for handler return types.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: CoreError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_client_errors_map_to_4xx() {
        assert_eq!(
            status_of(CoreError::InsufficientStock {
                stock_id: "stk-1".to_string(),
                available: 3,
                requested: 5,
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::InsufficientTopUp {
                stock_id: "stk-1".to_string(),
                required: 6,
                offered: 2,
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::stock_not_found("store-1", "stk-1")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CoreError::NotAuthorized {
                admin_id: "adm-2".to_string(),
                stock_id: "stk-1".to_string(),
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(CoreError::NothingToPay {
                admin_id: "adm-1".to_string(),
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_storage_maps_to_500() {
        let err = ApiError::from(SettlementError::storage("connection reset"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
