use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use tours_core::UserId;

use crate::app::dto::{UserRequest, UserResponse, WriteMode};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::{json_body, parse_id};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/api/users/", get(list_users).post(create_user))
        .route(
            "/api/users/:id/",
            get(get_user)
                .put(update_user)
                .patch(partial_update_user)
                .delete(delete_user),
        )
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = services.records.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let new = json_body(body)?.into_new()?;
    let user = services.records.create_user(new).await?;
    tracing::info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let id: UserId = parse_id(&id)?;
    let user = services.records.get_user(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(user.into()))
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    write_user(&services, &id, body, WriteMode::Full).await
}

pub async fn partial_update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    write_user(&services, &id, body, WriteMode::Partial).await
}

async fn write_user(
    services: &AppServices,
    id: &str,
    body: Result<Json<UserRequest>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<Json<UserResponse>> {
    let id: UserId = parse_id(id)?;
    let patch = json_body(body)?.into_patch(mode)?;
    let user = services
        .records
        .update_user(id, &patch)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::info!(user_id = %id, "user updated");
    Ok(Json(user.into()))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: UserId = parse_id(&id)?;
    if !services.records.delete_user(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
