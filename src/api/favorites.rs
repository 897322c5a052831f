//! Favorites API endpoints.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::types::normalize_symbol;
use crate::AppState;

/// Favorite flag after a toggle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggle {
    pub symbol: String,
    pub is_favorite: bool,
}

/// Create the favorites router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_favorites))
        .route("/:symbol", post(toggle_favorite))
}

async fn list_favorites(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::new(state.favorites.list()))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<FavoriteToggle>>> {
    let symbol = normalize_symbol(&symbol);
    if symbol.is_empty() {
        return Err(AppError::BadRequest("Symbol is required".to_string()));
    }

    let is_favorite = state.favorites.toggle(&symbol);
    Ok(Json(ApiResponse::new(FavoriteToggle { symbol, is_favorite })))
}
