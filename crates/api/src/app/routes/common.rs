use core::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use tours_core::DomainError;

use crate::app::errors::{ApiError, ApiResult};

/// Parse a path id; anything that is not a positive integer is a 404.
pub fn parse_id<I>(raw: &str) -> ApiResult<I>
where
    I: FromStr<Err = DomainError>,
{
    Ok(raw.parse()?)
}

/// Unwrap a JSON body, turning syntax/type failures into a 400.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value).map_err(ApiError::from)
}
