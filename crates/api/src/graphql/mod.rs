//! GraphQL surface: schema, executor endpoint and the GraphiQL explorer.

use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql::{EmptySubscription, Schema};
use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};

use tours_infra::RecordStore;

use crate::app::errors::ApiError;

pub mod mutation;
pub mod query;
pub mod types;

pub use mutation::{MutationRoot, ZoneUpdate};
pub use query::QueryRoot;

pub type CatalogSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub const GRAPHQL_PATH: &str = "/graphql";

pub fn build_schema(records: Arc<dyn RecordStore>) -> CatalogSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(records)
        .finish()
}

pub fn router() -> Router {
    Router::new().route(GRAPHQL_PATH, get(graphiql).post(graphql_handler))
}

pub async fn graphql_handler(
    Extension(schema): Extension<CatalogSchema>,
    body: Result<Json<async_graphql::Request>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(request)) => Json(schema.execute(request).await).into_response(),
        Err(rejection) => ApiError::from(rejection).into_response(),
    }
}

pub async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}
