//! Reliability API endpoints.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::types::{
    normalize_symbol, reliability_pct, Observation, ReliabilityRecord, ReliabilityResponse,
    ReliabilityScope,
};
use crate::AppState;

/// Create the reliability router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/:scope",
            get(get_scope_records)
                .post(record_observation)
                .delete(reset_scope),
        )
        .route("/:scope/:symbol", get(get_symbol_reliability))
}

fn parse_scope(scope: &str) -> Result<ReliabilityScope> {
    ReliabilityScope::from_name(scope)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown reliability scope: {}", scope)))
}

fn response(
    scope: ReliabilityScope,
    symbol: Option<String>,
    score: Option<u8>,
    records: Vec<ReliabilityRecord>,
) -> Json<ApiResponse<ReliabilityResponse>> {
    Json(ApiResponse::new(ReliabilityResponse {
        scope,
        symbol,
        score,
        records,
        timestamp: chrono::Utc::now().timestamp_millis(),
    }))
}

/// All records in a scope.
async fn get_scope_records(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> Result<Json<ApiResponse<ReliabilityResponse>>> {
    let scope = parse_scope(&scope)?;
    let records = match scope {
        ReliabilityScope::Local => state.local_reliability.records(),
        ReliabilityScope::Global => state.global_reliability.records().await,
    };
    Ok(response(scope, None, None, records))
}

/// Pooled score and per-pattern records for one symbol.
async fn get_symbol_reliability(
    State(state): State<AppState>,
    Path((scope, symbol)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ReliabilityResponse>>> {
    let scope = parse_scope(&scope)?;
    let symbol = normalize_symbol(&symbol);

    let (score, records) = match scope {
        ReliabilityScope::Local => (
            state.local_reliability.score_for_symbol(&symbol),
            state.local_reliability.records_for_symbol(&symbol),
        ),
        ReliabilityScope::Global => {
            // One Redis round trip: pool the refreshed records here
            let records = state.global_reliability.records_for_symbol(&symbol).await;
            let score = reliability_pct(
                records.iter().map(|r| r.preceding_move_count).sum(),
                records.iter().map(|r| r.occurrence_count).sum(),
            );
            (score, records)
        }
    };

    Ok(response(scope, Some(symbol), Some(score), records))
}

/// Record one confirmed observation.
async fn record_observation(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Json(observation): Json<Observation>,
) -> Result<Json<ApiResponse<ReliabilityRecord>>> {
    let scope = parse_scope(&scope)?;
    let symbol = normalize_symbol(&observation.symbol);
    if symbol.is_empty() {
        return Err(AppError::BadRequest("Symbol is required".to_string()));
    }

    let record = match scope {
        ReliabilityScope::Local => state.local_reliability.record_observation(
            &symbol,
            observation.signal_type,
            observation.preceded_significant_move,
        ),
        ReliabilityScope::Global => {
            state
                .global_reliability
                .record_observation(
                    &symbol,
                    observation.signal_type,
                    observation.preceded_significant_move,
                )
                .await
        }
    };

    Ok(Json(ApiResponse::new(record)))
}

/// Clear the local scope. The shared pool cannot be reset.
async fn reset_scope(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> Result<Json<ApiResponse<ReliabilityResponse>>> {
    match parse_scope(&scope)? {
        ReliabilityScope::Local => {
            state.local_reliability.reset();
            Ok(response(ReliabilityScope::Local, None, None, Vec::new()))
        }
        ReliabilityScope::Global => Err(AppError::BadRequest(
            "Global reliability cannot be reset".to_string(),
        )),
    }
}
