//! Payout and earnings endpoints.
//!
//! `run_payout` is the one write here; it serializes per admin inside the
//! calculator, so concurrent requests for the same admin cannot double-pay
//! a window.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use stockroom_core::types::{EarningsStatement, Payout};

use crate::error::ApiResult;
use crate::state::AppState;

/// `POST /super-admin/admins/{admin_id}/payout`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPayoutBody {
    /// The super admin triggering the payout, recorded on the row.
    pub paid_by: String,
}

/// `POST /super-admin/admins/{admin_id}/payout`
///
/// Pays the pending window. A window with no earnings answers 409
/// `nothing-to-pay` and leaves the window boundary untouched.
pub async fn run_payout(
    State(state): State<AppState>,
    Path(admin_id): Path<String>,
    Json(body): Json<RunPayoutBody>,
) -> ApiResult<Json<Payout>> {
    let payout = state.payouts.run_payout(&admin_id, &body.paid_by).await?;
    Ok(Json(payout))
}

/// `GET /super-admin/admins/{admin_id}/earnings`
///
/// Read-only preview of the pending window.
pub async fn get_earnings(
    State(state): State<AppState>,
    Path(admin_id): Path<String>,
) -> ApiResult<Json<EarningsStatement>> {
    let statement = state.payouts.earnings(&admin_id).await?;
    Ok(Json(statement))
}

/// `GET /super-admin/admins/{admin_id}/payouts`
pub async fn list_payouts(
    State(state): State<AppState>,
    Path(admin_id): Path<String>,
) -> ApiResult<Json<Vec<Payout>>> {
    let payouts = state.payouts.history(&admin_id).await?;
    Ok(Json(payouts))
}
