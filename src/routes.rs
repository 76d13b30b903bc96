use crate::error::ApiError;
use crate::localizations::{parse_project_ids, LocalizationService};
use crate::models::{BulkUpdateRequest, BulkUpdateResponse, LocalizationBundle, RowsEnvelope};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub type AppState = Arc<LocalizationService>;

/// Build the API router.
///
/// `max_body_bytes` caps bulk-update request bodies; `None` leaves them
/// unlimited.
pub fn router(service: AppState, max_body_bytes: Option<usize>) -> Router {
    let body_limit = match max_body_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route(
            "/api/localizations/:project_id/:locale",
            get(get_localizations),
        )
        .route("/api/localizations", get(get_all_localizations))
        .route(
            "/localizations-by-project-id/:project_id",
            get(get_localizations_by_project_id),
        )
        .route(
            "/localizations-by-project-ids",
            get(get_localizations_by_project_ids),
        )
        .route(
            "/localizations/bulk-update",
            put(bulk_update_localizations).layer(body_limit),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Fixed placeholder bundle; the store is not consulted
async fn get_localizations(
    Path((project_id, locale)): Path<(String, String)>,
) -> Json<LocalizationBundle> {
    Json(LocalizationBundle::placeholder(project_id, locale))
}

async fn get_all_localizations(
    State(service): State<AppState>,
) -> Result<Json<RowsEnvelope>, ApiError> {
    let rows = service.list_all().await?;
    Ok(Json(rows.into()))
}

async fn get_localizations_by_project_id(
    State(service): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<RowsEnvelope>, ApiError> {
    let rows = service.find_by_project_id(&project_id).await?;
    Ok(Json(rows.into()))
}

#[derive(Debug, Deserialize)]
struct ProjectIdsParams {
    project_ids: String,
}

async fn get_localizations_by_project_ids(
    State(service): State<AppState>,
    params: Result<Query<ProjectIdsParams>, QueryRejection>,
) -> Result<Json<RowsEnvelope>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let project_ids = parse_project_ids(&params.project_ids);
    let rows = service.find_by_project_ids(project_ids).await?;
    Ok(Json(rows.into()))
}

async fn bulk_update_localizations(
    State(service): State<AppState>,
    payload: Result<Json<BulkUpdateRequest>, JsonRejection>,
) -> Result<Json<BulkUpdateResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BulkUpdate(e.body_text()))?;

    info!("Bulk update of {} localizations", request.updates.len());
    let response = service.bulk_update(request.updates).await;
    Ok(Json(response))
}
