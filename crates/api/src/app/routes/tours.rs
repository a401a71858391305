use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use tours_core::TourId;

use crate::app::dto::{TourRequest, TourResponse, WriteMode};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::{json_body, parse_id};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/api/tours/", get(list_tours).post(create_tour))
        .route(
            "/api/tours/:id/",
            get(get_tour)
                .put(update_tour)
                .patch(partial_update_tour)
                .delete(delete_tour),
        )
}

pub async fn list_tours(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Vec<TourResponse>>> {
    let tours = services.records.list_tours().await?;
    Ok(Json(tours.into_iter().map(TourResponse::from).collect()))
}

pub async fn create_tour(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<TourRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TourResponse>)> {
    let new = json_body(body)?.into_new()?;
    let tour = services.records.create_tour(new).await?;
    tracing::info!(tour_id = %tour.id, "tour created");
    Ok((StatusCode::CREATED, Json(tour.into())))
}

pub async fn get_tour(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TourResponse>> {
    let id: TourId = parse_id(&id)?;
    let tour = services.records.get_tour(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(tour.into()))
}

pub async fn update_tour(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<TourRequest>, JsonRejection>,
) -> ApiResult<Json<TourResponse>> {
    write_tour(&services, &id, body, WriteMode::Full).await
}

pub async fn partial_update_tour(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<TourRequest>, JsonRejection>,
) -> ApiResult<Json<TourResponse>> {
    write_tour(&services, &id, body, WriteMode::Partial).await
}

async fn write_tour(
    services: &AppServices,
    id: &str,
    body: Result<Json<TourRequest>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<Json<TourResponse>> {
    let id: TourId = parse_id(id)?;
    let patch = json_body(body)?.into_patch(mode)?;
    let tour = services
        .records
        .update_tour(id, &patch)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(tour_id = %id, "tour updated");
    Ok(Json(tour.into()))
}

pub async fn delete_tour(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: TourId = parse_id(&id)?;
    if !services.records.delete_tour(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(tour_id = %id, "tour deleted");
    Ok(StatusCode::NO_CONTENT)
}
