//! Purchase settlement endpoint.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use stockroom_settlement::{PurchaseRequest, SettlementReceipt};

use crate::error::ApiResult;
use crate::state::AppState;

/// `POST /stores/{store_id}/purchase`
///
/// The store comes from the path, the stock from the body, and the rest of
/// the body is the settlement request itself.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseBody {
    pub stock_id: String,
    #[serde(flatten)]
    pub request: PurchaseRequest,
}

/// Settles one purchase. Retrying with the same `orderReference` returns
/// the original receipt with `alreadySettled` set instead of moving stock
/// twice.
pub async fn settle_purchase(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    Json(body): Json<PurchaseBody>,
) -> ApiResult<Json<SettlementReceipt>> {
    let receipt = state
        .settlement
        .settle(&store_id, &body.stock_id, body.request)
        .await?;
    Ok(Json(receipt))
}
