use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use tours_catalog::{Zone, ZoneRole};
use tours_core::ZoneId;
use tours_infra::RecordStore;

use crate::app::dto::{WriteMode, ZoneRequest, ZoneResponse};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::{json_body, parse_id};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/api/zones/", get(list_zones).post(create_zone))
        .route(
            "/api/zones/:id/",
            get(get_zone)
                .put(update_zone)
                .patch(partial_update_zone)
                .delete(delete_zone),
        )
}

async fn project(records: &dyn RecordStore, zone: Zone) -> ApiResult<ZoneResponse> {
    let departing = records.tours_for_zone(zone.id, ZoneRole::Departure).await?;
    let arriving = records.tours_for_zone(zone.id, ZoneRole::Arrival).await?;
    Ok(ZoneResponse::new(zone, departing, arriving))
}

pub async fn list_zones(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Vec<ZoneResponse>>> {
    let zones = services.records.list_zones().await?;
    let tours = services.records.list_tours().await?;
    Ok(Json(
        zones
            .into_iter()
            .map(|zone| ZoneResponse::from_tours(zone, &tours))
            .collect(),
    ))
}

pub async fn create_zone(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ZoneRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ZoneResponse>)> {
    let new = json_body(body)?.into_new()?;
    let zone = services.records.create_zone(new).await?;
    tracing::info!(zone_id = %zone.id, "zone created");
    Ok((StatusCode::CREATED, Json(ZoneResponse::new(zone, Vec::new(), Vec::new()))))
}

pub async fn get_zone(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ZoneResponse>> {
    let id: ZoneId = parse_id(&id)?;
    let zone = services.records.get_zone(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(project(services.records.as_ref(), zone).await?))
}

pub async fn update_zone(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ZoneRequest>, JsonRejection>,
) -> ApiResult<Json<ZoneResponse>> {
    write_zone(&services, &id, body, WriteMode::Full).await
}

pub async fn partial_update_zone(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ZoneRequest>, JsonRejection>,
) -> ApiResult<Json<ZoneResponse>> {
    write_zone(&services, &id, body, WriteMode::Partial).await
}

async fn write_zone(
    services: &AppServices,
    id: &str,
    body: Result<Json<ZoneRequest>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<Json<ZoneResponse>> {
    let id: ZoneId = parse_id(id)?;
    let patch = json_body(body)?.into_patch(mode)?;
    let zone = services
        .records
        .update_zone(id, &patch)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(zone_id = %id, "zone updated");
    Ok(Json(project(services.records.as_ref(), zone).await?))
}

pub async fn delete_zone(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: ZoneId = parse_id(&id)?;
    if !services.records.delete_zone(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(zone_id = %id, "zone deleted");
    Ok(StatusCode::NO_CONTENT)
}
