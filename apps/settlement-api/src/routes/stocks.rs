//! Stock lifecycle, listings and rebalancing endpoints.
//!
//! Mutations carry the acting admin explicitly (`adminId`); ownership is
//! enforced by the catalog service, not here. Listings go through the
//! read-through cache and keys the purchase flow invalidates.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use stockroom_core::types::{NewStockItem, StockItem, StockPatch};
use stockroom_settlement::RebalanceOutcome;

use crate::error::ApiResult;
use crate::state::AppState;

// =============================================================================
// DTOs
// =============================================================================

/// `POST /admin/stocks`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStockBody {
    pub admin_id: String,
    pub store_id: String,
    pub name: String,
    pub quantity: i64,
    pub price_cents: i64,
}

/// `PUT /admin/stocks/{store_id}/{stock_id}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockBody {
    pub admin_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
}

/// Acting admin for requests without a body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminQuery {
    pub admin_id: String,
}

/// `POST /admin/rebalance-stock`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceBody {
    pub admin_id: String,
    pub store_id: String,
    pub stock_id: String,
    pub quantity_to_add: i64,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn create_stock(
    State(state): State<AppState>,
    Json(body): Json<CreateStockBody>,
) -> ApiResult<(StatusCode, Json<StockItem>)> {
    let item = state
        .catalog
        .create_stock(
            &body.admin_id,
            NewStockItem {
                store_id: body.store_id,
                name: body.name,
                quantity: body.quantity,
                price_cents: body.price_cents,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_stock(
    State(state): State<AppState>,
    Path((store_id, stock_id)): Path<(String, String)>,
) -> ApiResult<Json<StockItem>> {
    let item = state.catalog.get_stock(&store_id, &stock_id).await?;
    Ok(Json(item))
}

pub async fn update_stock(
    State(state): State<AppState>,
    Path((store_id, stock_id)): Path<(String, String)>,
    Json(body): Json<UpdateStockBody>,
) -> ApiResult<Json<StockItem>> {
    let patch = StockPatch {
        name: body.name,
        price_cents: body.price_cents,
    };
    let item = state
        .catalog
        .update_stock(&store_id, &stock_id, &body.admin_id, patch)
        .await?;
    Ok(Json(item))
}

pub async fn delete_stock(
    State(state): State<AppState>,
    Path((store_id, stock_id)): Path<(String, String)>,
    Query(query): Query<AdminQuery>,
) -> ApiResult<Json<StockItem>> {
    let item = state
        .catalog
        .delete_stock(&store_id, &stock_id, &query.admin_id)
        .await?;
    Ok(Json(item))
}

pub async fn list_store_stocks(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> ApiResult<Json<Vec<StockItem>>> {
    let items = state.catalog.list_stocks(&store_id).await?;
    Ok(Json(items))
}

pub async fn list_all_stocks(State(state): State<AppState>) -> ApiResult<Json<Vec<StockItem>>> {
    let items = state.catalog.list_all_stocks().await?;
    Ok(Json(items))
}

pub async fn rebalance_stock(
    State(state): State<AppState>,
    Json(body): Json<RebalanceBody>,
) -> ApiResult<Json<RebalanceOutcome>> {
    let outcome = state
        .catalog
        .rebalance(
            &body.store_id,
            &body.stock_id,
            &body.admin_id,
            body.quantity_to_add,
        )
        .await?;
    Ok(Json(outcome))
}
