//! HTTP handler functions for the dashboard API.

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{HttpRequest, HttpResponse, web};
use game_viz_dashboard::{ALL_REGIONS, DashboardError, DashboardEvent, DashboardHandle};
use game_viz_server_models::{ApiError, ApiHealth, ApiRegions, ApiViewSummary};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/views`
///
/// Lists every view with its current load status.
pub async fn views(state: web::Data<AppState>) -> HttpResponse {
    let summaries: Vec<ApiViewSummary> = state
        .views()
        .map(|handle| {
            let snapshot = handle.snapshot();
            ApiViewSummary {
                id: snapshot.view_id.clone(),
                title: snapshot.title.clone(),
                status: snapshot.status.to_string(),
                record_count: snapshot.record_count,
                has_regions: handle.view().region_column.is_some(),
            }
        })
        .collect();

    HttpResponse::Ok().json(summaries)
}

/// `GET /api/views/{id}`
///
/// Returns the latest snapshot of a view.
pub async fn snapshot(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match state.view(&path) {
        Some(handle) => HttpResponse::Ok().json(&*handle.snapshot()),
        None => view_not_found(&path),
    }
}

/// `GET /api/views/{id}/regions`
///
/// Returns the region dropdown entries, `"All"` first.
pub async fn regions(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let Some(handle) = state.view(&path) else {
        return view_not_found(&path);
    };

    match handle.regions().await {
        Ok(regions) => {
            let regions = if handle.view().region_column.is_some() {
                std::iter::once(ALL_REGIONS.to_string())
                    .chain(regions)
                    .collect()
            } else {
                Vec::new()
            };
            HttpResponse::Ok().json(ApiRegions {
                view_id: path.into_inner(),
                regions,
            })
        }
        Err(e) => dashboard_error(&e),
    }
}

/// `POST /api/views/{id}/events`
///
/// Applies one interaction event and returns the resulting snapshot.
pub async fn apply_event(
    state: web::Data<AppState>,
    path: web::Path<String>,
    event: web::Json<DashboardEvent>,
) -> HttpResponse {
    let Some(handle) = state.view(&path) else {
        return view_not_found(&path);
    };

    apply(handle, event.into_inner()).await
}

async fn apply(handle: &DashboardHandle, event: DashboardEvent) -> HttpResponse {
    log::debug!("[{}] Event: {event:?}", handle.view().id);
    match handle.apply(event).await {
        Ok(snapshot) => HttpResponse::Ok().json(&*snapshot),
        Err(e) => dashboard_error(&e),
    }
}

/// Rejects an unreadable JSON body with a JSON error instead of actix's
/// plain-text default.
pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected request body: {err}");
    let response = HttpResponse::BadRequest().json(ApiError::new(err.to_string()));
    InternalError::from_response(err, response).into()
}

fn view_not_found(id: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiError::new(format!("View '{id}' not found")))
}

fn dashboard_error(e: &DashboardError) -> HttpResponse {
    match e {
        DashboardError::UnknownCell { .. } => {
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
        DashboardError::Closed(_) => {
            log::error!("{e}");
            HttpResponse::ServiceUnavailable().json(ApiError::new(e.to_string()))
        }
    }
}
