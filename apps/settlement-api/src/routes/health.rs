//! Health check endpoint.
//!
//! Degraded-not-down semantics: the API keeps serving while Redis is
//! unreachable (every Redis call in the services is best-effort), so a cache
//! failure reports `degraded` under a 200. Only a dead database, which the
//! settlement flows cannot work without, turns the response into a 503.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub cache: &'static str,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.db {
        Some(db) => {
            if db.health_check().await {
                "ok"
            } else {
                "down"
            }
        }
        None => "skipped",
    };

    let cache = match &state.redis {
        Some(bus) => match bus.ping().await {
            Ok(()) => "ok",
            Err(_) => "degraded",
        },
        None => "skipped",
    };

    let (status_code, status) = if database == "down" {
        (StatusCode::SERVICE_UNAVAILABLE, "down")
    } else if cache == "degraded" {
        (StatusCode::OK, "degraded")
    } else {
        (StatusCode::OK, "ok")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            database,
            cache,
        }),
    )
}
