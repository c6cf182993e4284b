//! HTTP surface: the settlement endpoint plus liveness and CORS preflight.
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use log::error;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use skylink_core::settlement::{settle, SettlementContext, SettlementError};
use skylink_core::{AirlineState, EconomyConfig, PirepSubmission, StateStore};

use crate::store::JsonFileStore;

/// Shared service state: the airline datastore behind an async mutex so each
/// settlement's stage sequence applies without interleaving.
pub struct AppState {
    pub airline: Mutex<AirlineState>,
    pub config: EconomyConfig,
    pub secret: Option<String>,
    pub store: Option<JsonFileStore>,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/acars/pirep", post(submit_pirep).options(preflight))
        .route("/api/acars/ping", get(ping).options(preflight))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The desktop client sends a bare preflight before every submission.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn submit_pirep(
    State(state): State<SharedState>,
    Json(submission): Json<PirepSubmission>,
) -> Response {
    let ctx = SettlementContext {
        config: &state.config,
        secret: state.secret.as_deref(),
        now: Utc::now(),
    };
    let mut rng = SmallRng::from_entropy();

    let mut airline = state.airline.lock().await;
    let outcome = settle(&mut airline, &ctx, &submission, &mut rng);

    match outcome {
        Ok(response) => {
            if let Some(store) = &state.store {
                if let Err(e) = store.save(&airline) {
                    // The mutation happened but is not durable; surface 500
                    // so the client retries against the reloaded snapshot.
                    error!("state snapshot failed: {e}");
                    return error_response(&SettlementError::Persistence(e.to_string()));
                }
            }
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("settlement refused: {e}");
            error_response(&e)
        }
    }
}

fn error_response(e: &SettlementError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = match e {
        SettlementError::Security(m) | SettlementError::NotFound(m) => m.clone(),
        SettlementError::Persistence(_) => "Failed to submit PIREP".to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
}
