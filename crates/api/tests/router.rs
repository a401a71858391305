use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use tours_api::app::{build_app, AppServices};

fn app() -> Router {
    build_app(Arc::new(AppServices::in_memory("router-secret", Duration::minutes(5))))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_paths_are_404() {
    let response = app()
        .oneshot(Request::builder().uri("/api/salidas/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn index_requires_a_session() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login/?next=/");
}

#[tokio::test]
async fn rest_and_graphql_share_one_store() {
    let app = app();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/zones/", json!({"name": "Chachapoyas"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request("POST", "/graphql", json!({"query": "{ allZones { id name } }"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"data": {"allZones": [{"id": "1", "name": "Chachapoyas"}]}})
    );
}

#[tokio::test]
async fn wrong_shape_is_400_not_422() {
    let response = app()
        .oneshot(json_request("POST", "/api/tours/", json!({"name": "x", "zonaSalida": "uno"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({
            "zonaSalida": ["Incorrect type. Expected pk value, received str."],
            "zonaLlegada": ["This field is required."]
        })
    );

    let response = app()
        .oneshot(json_request("POST", "/api/zones/", json!("Cusco")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["detail"].is_string());
}
