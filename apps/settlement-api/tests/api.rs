//! HTTP surface tests over memory-backed state.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`: no
//! socket, no PostgreSQL, no Redis. What these tests pin down is the route
//! table, DTO parsing, and the error-to-status mapping; the flows behind
//! the handlers have their own suite in `stockroom-settlement`.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use settlement_api::routes;
use settlement_api::state::AppState;
use stockroom_core::types::StockItem;
use stockroom_settlement::memory::MemoryWorld;

const STORE: &str = "store-1";
const STOCK: &str = "stk-1";
const ADMIN: &str = "adm-1";

fn memory_app() -> (Router, MemoryWorld) {
    let world = MemoryWorld::new();
    let state = AppState::new(world.ports(), Duration::from_secs(600));
    (routes::router(state), world)
}

fn seed_stock(world: &MemoryWorld, quantity: i64, price_cents: i64) {
    let now = Utc::now();
    world.stocks.seed(StockItem {
        id: STOCK.to_string(),
        store_id: STORE.to_string(),
        admin_id: ADMIN.to_string(),
        name: "Espresso Beans 1kg".to_string(),
        quantity,
        price_cents,
        created_at: now,
        updated_at: now,
    });
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

// =============================================================================
// Purchases
// =============================================================================

#[tokio::test]
async fn purchase_settles_then_replays() {
    let (app, world) = memory_app();
    seed_stock(&world, 12, 5000);

    let (status, receipt) = post(
        &app,
        "/stores/store-1/purchase",
        json!({
            "stockId": STOCK,
            "quantity": 3,
            "orderReference": "ord-100",
            "customerId": "cust-1"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["newQuantity"], 9);
    assert_eq!(receipt["totalCents"], 15_000);
    assert_eq!(receipt["alertFired"], true);
    assert_eq!(receipt["alreadySettled"], false);

    // Same order again: original receipt back, no second decrement.
    let (status, replay) = post(
        &app,
        "/stores/store-1/purchase",
        json!({
            "stockId": STOCK,
            "quantity": 3,
            "orderReference": "ord-100",
            "customerId": "cust-1"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay["alreadySettled"], true);
    assert_eq!(replay["newQuantity"], Value::Null);
    assert_eq!(world.stocks.quantity_of(STOCK), Some(9));
}

#[tokio::test]
async fn purchase_oversell_is_400_with_error_body() {
    let (app, world) = memory_app();
    seed_stock(&world, 2, 5000);

    let (status, body) = post(
        &app,
        "/stores/store-1/purchase",
        json!({
            "stockId": STOCK,
            "quantity": 5,
            "orderReference": "ord-101"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "insufficient-stock");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("available 2"), "message: {message}");
    assert_eq!(body.as_object().unwrap().len(), 2);
    assert_eq!(world.stocks.quantity_of(STOCK), Some(2));
}

#[tokio::test]
async fn purchase_validation_failures_are_400() {
    let (app, world) = memory_app();
    seed_stock(&world, 12, 5000);

    let (status, body) = post(
        &app,
        "/stores/store-1/purchase",
        json!({
            "stockId": STOCK,
            "quantity": 0,
            "orderReference": "ord-102"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
}

#[tokio::test]
async fn purchase_of_unknown_stock_is_404() {
    let (app, _world) = memory_app();

    let (status, body) = post(
        &app,
        "/stores/store-1/purchase",
        json!({
            "stockId": "missing",
            "quantity": 1,
            "orderReference": "ord-103"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not-found");
}

// =============================================================================
// Stock Lifecycle
// =============================================================================

#[tokio::test]
async fn stock_lifecycle_over_admin_routes() {
    let (app, _world) = memory_app();

    let (status, created) = post(
        &app,
        "/admin/stocks",
        json!({
            "adminId": ADMIN,
            "storeId": STORE,
            "name": "Filter Papers",
            "quantity": 20,
            "priceCents": 450
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let stock_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["quantity"], 20);

    let (status, fetched) = get(&app, &format!("/admin/stocks/{STORE}/{stock_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Filter Papers");

    // Owner renames and reprices
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/admin/stocks/{STORE}/{stock_id}"),
        Some(json!({
            "adminId": ADMIN,
            "name": "Filter Papers (100pk)",
            "priceCents": 500
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Filter Papers (100pk)");
    assert_eq!(updated["priceCents"], 500);

    // Someone else cannot
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/admin/stocks/{STORE}/{stock_id}"),
        Some(json!({ "adminId": "adm-2", "name": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "not-authorized");

    let (status, listing) = get(&app, &format!("/stores/{STORE}/stocks")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().unwrap().len(), 1);

    let (status, removed) = send(
        &app,
        Method::DELETE,
        &format!("/admin/stocks/{STORE}/{stock_id}?adminId={ADMIN}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["id"], stock_id.as_str());

    // Deletion invalidated the cached listing, so the fresh read is empty.
    let (status, listing) = get(&app, &format!("/stores/{STORE}/stocks")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn listings_populate_the_cache() {
    let (app, world) = memory_app();
    seed_stock(&world, 12, 5000);

    let (status, all) = get(&app, "/stocks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert!(world.cache.contains("stocks"));

    let (status, store) = get(&app, &format!("/stores/{STORE}/stocks")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.as_array().unwrap().len(), 1);
    assert!(world.cache.contains("stocks:store-1"));
}

#[tokio::test]
async fn all_stocks_listing_spans_stores() {
    let (app, _world) = memory_app();

    for (store, name) in [("store-1", "Beans"), ("store-2", "Grinder")] {
        let (status, _) = post(
            &app,
            "/admin/stocks",
            json!({
                "adminId": ADMIN,
                "storeId": store,
                "name": name,
                "quantity": 15,
                "priceCents": 1000
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, all) = get(&app, "/stocks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);
}

// =============================================================================
// Rebalancing
// =============================================================================

#[tokio::test]
async fn rebalance_enforces_the_topup_floor() {
    let (app, world) = memory_app();
    seed_stock(&world, 5, 5000);

    let (status, body) = post(
        &app,
        "/admin/rebalance-stock",
        json!({
            "adminId": ADMIN,
            "storeId": STORE,
            "stockId": STOCK,
            "quantityToAdd": 3
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "insufficient-top-up");
    assert!(body["message"].as_str().unwrap().contains("at least 6"));

    let (status, outcome) = post(
        &app,
        "/admin/rebalance-stock",
        json!({
            "adminId": ADMIN,
            "storeId": STORE,
            "stockId": STOCK,
            "quantityToAdd": 10
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["newQuantity"], 15);
    assert_eq!(outcome["alertFired"], false);
}

// =============================================================================
// Payouts
// =============================================================================

#[tokio::test]
async fn payout_flow_over_the_api() {
    let (app, world) = memory_app();
    seed_stock(&world, 50, 10_000);

    for order in ["ord-1", "ord-2", "ord-3"] {
        let (status, _) = post(
            &app,
            "/stores/store-1/purchase",
            json!({
                "stockId": STOCK,
                "quantity": 1,
                "orderReference": order
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // 300.00 gross at the default 15% tier
    let (status, earnings) = get(&app, &format!("/super-admin/admins/{ADMIN}/earnings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(earnings["grossCents"], 30_000);
    assert_eq!(earnings["rateBps"], 1500);
    assert_eq!(earnings["netCents"], 25_500);

    let payout_uri = format!("/super-admin/admins/{ADMIN}/payout");
    let (status, payout) = post(&app, &payout_uri, json!({ "paidBy": "super-1" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payout["amountCents"], 25_500);
    assert_eq!(payout["grossCents"], 30_000);
    assert_eq!(payout["paidBy"], "super-1");

    // The window advanced; nothing is left to pay.
    let (status, body) = post(&app, &payout_uri, json!({ "paidBy": "super-1" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "nothing-to-pay");

    let (status, history) = get(&app, &format!("/super-admin/admins/{ADMIN}/payouts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_reports_ok_without_infra() {
    let (app, _world) = memory_app();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "skipped");
    assert_eq!(body["cache"], "skipped");
}
