//! HTTP route modules.
//!
//! # Structure
//!
//! - [`health`] - liveness and dependency checks
//! - [`purchase`] - purchase settlement
//! - [`stocks`] - stock lifecycle, listings, rebalancing
//! - [`payout`] - earnings previews and payout runs
//!
//! Handlers parse and validate DTOs, call the services, and map domain
//! errors to statuses. Business logic stays in `stockroom-settlement`.

pub mod health;
pub mod payout;
pub mod purchase;
pub mod stocks;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assembles the full route table over the shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Storefront
        .route("/stocks", get(stocks::list_all_stocks))
        .route("/stores/{store_id}/stocks", get(stocks::list_store_stocks))
        .route("/stores/{store_id}/purchase", post(purchase::settle_purchase))
        // Admin: stock lifecycle
        .route("/admin/stocks", post(stocks::create_stock))
        .route(
            "/admin/stocks/{store_id}/{stock_id}",
            get(stocks::get_stock)
                .put(stocks::update_stock)
                .delete(stocks::delete_stock),
        )
        .route("/admin/rebalance-stock", post(stocks::rebalance_stock))
        // Super admin: payouts
        .route("/super-admin/admins/{admin_id}/payout", post(payout::run_payout))
        .route("/super-admin/admins/{admin_id}/earnings", get(payout::get_earnings))
        .route("/super-admin/admins/{admin_id}/payouts", get(payout::list_payouts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
