//! Analysis API endpoints.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::ApiResponse;
use crate::error::Result;
use crate::types::AnalysisResult;
use crate::AppState;

/// Create the analysis router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_watchlist_analysis))
        .route("/:symbol", get(get_symbol_analysis))
}

/// Analyze every watchlist symbol, favorites first.
async fn get_watchlist_analysis(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<AnalysisResult>>> {
    let results = state
        .analysis
        .analyze_watchlist(&state.config.watchlist)
        .await;
    Json(ApiResponse::new(results))
}

/// Analyze one symbol.
async fn get_symbol_analysis(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<AnalysisResult>>> {
    let result = state.analysis.analyze(&symbol).await?;
    Ok(Json(ApiResponse::new(result)))
}
