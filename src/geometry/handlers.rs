use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{dto::MessageResponse, jwt::AuthUser},
    error::ApiError,
    geometry::{
        dto::{MarkerDto, PolygonDto, SaveMarkersRequest, SavePolygonsRequest},
        repo,
    },
    state::AppState,
};

pub fn geometry_routes() -> Router<AppState> {
    Router::new()
        .route("/markers", get(get_markers).post(save_markers))
        .route("/polygons", get(get_polygons).post(save_polygons))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_markers(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<MarkerDto>>, ApiError> {
    let markers = repo::list_markers(&state.db, user.id).await?;
    Ok(Json(markers))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn save_markers(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SaveMarkersRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    repo::replace_markers(&state.db, user.id, &payload.markers).await?;
    info!(count = payload.markers.len(), "markers replaced");
    Ok(Json(MessageResponse {
        message: "Markers saved",
    }))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_polygons(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<PolygonDto>>, ApiError> {
    let polygons = repo::list_polygons(&state.db, user.id).await?;
    Ok(Json(polygons))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn save_polygons(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SavePolygonsRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    repo::replace_polygons(&state.db, user.id, &payload.polygons).await?;
    info!(count = payload.polygons.len(), "polygons replaced");
    Ok(Json(MessageResponse {
        message: "Polygons saved",
    }))
}
