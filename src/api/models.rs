use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::error::ApiError;
use crate::models::DeviceModel;
use crate::server::AppState;

/// List configured device models
#[utoipa::path(
    get,
    path = "/api/models",
    responses(
        (status = 200, description = "Known device models", body = [DeviceModel]),
    ),
    tag = "Models"
)]
pub async fn handle_list_models(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeviceModel>>, ApiError> {
    Ok(Json(state.registry.list().await?))
}

/// Get one device model
#[utoipa::path(
    get,
    path = "/api/models/{id}",
    params(("id" = String, Path, description = "Model id (e.g. 'og')")),
    responses(
        (status = 200, description = "Device model", body = DeviceModel),
        (status = 404, description = "Unknown model"),
    ),
    tag = "Models"
)]
pub async fn handle_get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeviceModel>, ApiError> {
    state
        .registry
        .find(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}
