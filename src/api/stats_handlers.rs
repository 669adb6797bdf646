//! HTTP endpoint handlers for the anonymous usage counters

use std::sync::Arc;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    analytics::{AnalyticsTotals, CounterEvent},
    state::AppState,
};
use super::responses::{ErrorResponse, IncrementRequest, IncrementResponse, ResetQuery};

type StatsError = (StatusCode, Json<ErrorResponse>);

fn failure(status: StatusCode, message: &str) -> StatsError {
    (status, Json(ErrorResponse::new(message)))
}

/// Handle POST /api/stats/increment - Bump one counter
pub async fn increment_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IncrementRequest>,
) -> Result<Json<IncrementResponse>, StatsError> {
    let event = match request.event.as_deref().map(str::parse::<CounterEvent>) {
        Some(Ok(event)) => event,
        _ => {
            warn!("Rejected analytics event {:?}", request.event);
            return Err(failure(StatusCode::BAD_REQUEST, "Invalid event type"));
        }
    };

    match state.analytics.increment(event) {
        Ok(total) => Ok(Json(IncrementResponse { event, total })),
        Err(e) => {
            error!("Failed to increment {}: {}", event, e);
            Err(failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to increment counter"))
        }
    }
}

/// Handle GET /api/stats/get - Current totals
pub async fn get_stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnalyticsTotals>, StatsError> {
    state.analytics.totals().map(Json).map_err(|e| {
        error!("Failed to read analytics: {}", e);
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read stats")
    })
}

/// Handle POST /api/stats/reset?key= - Zero the totals; requires the reset key
pub async fn reset_stats_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResetQuery>,
) -> Result<Json<AnalyticsTotals>, StatsError> {
    if !state.reset_key_matches(query.key.as_deref()) {
        warn!("Unauthorized analytics reset attempt");
        return Err(failure(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }

    match state.analytics.reset() {
        Ok(totals) => {
            info!("Analytics counters reset");
            Ok(Json(totals))
        }
        Err(e) => {
            error!("Failed to reset analytics: {}", e);
            Err(failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to reset stats"))
        }
    }
}
