mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{client, post_json, TestServer};

async fn create(client: &reqwest::Client, srv: &TestServer, path: &str, body: Value) -> Value {
    let res = post_json(client, srv.url(path), body).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_and_api_root() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let root: Value = client.get(srv.url("/api/")).send().await.unwrap().json().await.unwrap();
    assert_eq!(root["users"], "/api/users/");
    assert_eq!(root["zones"], "/api/zones/");
    assert_eq!(root["tours"], "/api/tours/");
}

#[tokio::test]
async fn user_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = client();

    let donald = create(
        &client,
        &srv,
        "/api/users/",
        json!({
            "name": "Donald",
            "last_name": "Mac Pato",
            "email": "donald@pato.org",
            "birthday": "2000-01-01",
            "genre": "H"
        }),
    )
    .await;
    assert_eq!(
        donald,
        json!({
            "id": 1,
            "name": "Donald",
            "last_name": "Mac Pato",
            "email": "donald@pato.org",
            "birthday": "2000-01-01",
            "genre": "H",
            "key": null,
            "type": null
        })
    );

    let listed: Value = client.get(srv.url("/api/users/")).send().await.unwrap().json().await.unwrap();
    assert_eq!(listed, json!([donald.clone()]));

    let res = client
        .patch(srv.url("/api/users/1/"))
        .json(&json!({"email": "pato@pato.org", "type": "guia"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let patched: Value = res.json().await.unwrap();
    assert_eq!(patched["email"], "pato@pato.org");
    assert_eq!(patched["type"], "guia");
    assert_eq!(patched["birthday"], "2000-01-01");

    // PUT needs every required field.
    let res = client
        .put(srv.url("/api/users/1/"))
        .json(&json!({"name": "Donald", "email": "donald@pato.org"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let errors: Value = res.json().await.unwrap();
    assert_eq!(errors, json!({"last_name": ["This field is required."]}));

    let res = client.delete(srv.url("/api/users/1/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.get(srv.url("/api/users/1/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"detail": "Not found."}));
}

#[tokio::test]
async fn user_email_is_validated() {
    let srv = TestServer::spawn().await;
    let res = post_json(
        &client(),
        srv.url("/api/users/"),
        json!({"name": "Daisy", "last_name": "Duck", "email": "not-an-email"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let errors: Value = res.json().await.unwrap();
    assert!(errors["email"].is_array());
}

#[tokio::test]
async fn user_type_errors_are_reported_per_field() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = post_json(
        &client,
        srv.url("/api/users/"),
        json!({
            "name": "Donald",
            "last_name": "Mac Pato",
            "email": "donald@pato.org",
            "birthday": "not-a-date",
            "genre": "X"
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let errors: Value = res.json().await.unwrap();
    assert_eq!(
        errors,
        json!({
            "birthday": ["Date has wrong format. Use one of these formats instead: YYYY-MM-DD."],
            "genre": ["\"X\" is not a valid choice."]
        })
    );

    let res = post_json(
        &client,
        srv.url("/api/users/"),
        json!({"name": null, "last_name": "Mac Pato", "email": "donald@pato.org"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let errors: Value = res.json().await.unwrap();
    assert_eq!(errors, json!({"name": ["This field may not be null."]}));

    let users: Value = client.get(srv.url("/api/users/")).send().await.unwrap().json().await.unwrap();
    assert_eq!(users, json!([]));
}

#[tokio::test]
async fn zone_detail_nests_tours_by_role() {
    let srv = TestServer::spawn().await;
    let client = client();

    let cusco = create(&client, &srv, "/api/zones/", json!({"name": "Cusco", "latitud": "-13.53"})).await;
    let puno = create(&client, &srv, "/api/zones/", json!({"name": "Puno"})).await;
    assert_eq!(cusco["tours_salida"], json!([]));
    assert_eq!(puno["latitud"], Value::Null);

    let ida = create(
        &client,
        &srv,
        "/api/tours/",
        json!({"name": "Ida", "zonaSalida": cusco["id"], "zonaLlegada": puno["id"]}),
    )
    .await;
    let vuelta = create(
        &client,
        &srv,
        "/api/tours/",
        json!({"name": "Vuelta", "img": "vuelta.jpg", "zonaSalida": puno["id"], "zonaLlegada": cusco["id"]}),
    )
    .await;
    assert_eq!(vuelta["img"], "vuelta.jpg");

    let detail: Value = client
        .get(srv.url(&format!("/api/zones/{}/", cusco["id"])))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["name"], "Cusco");
    assert_eq!(detail["latitud"], "-13.53");
    assert_eq!(detail["tours_salida"], json!([ida]));
    assert_eq!(detail["tours_llegada"], json!([vuelta]));

    let all: Value = client.get(srv.url("/api/zones/")).send().await.unwrap().json().await.unwrap();
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(all[1]["tours_salida"], json!([vuelta]));
}

#[tokio::test]
async fn zone_input_errors_are_400() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = post_json(&client, srv.url("/api/zones/"), json!({"description": "sin nombre"})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let errors: Value = res.json().await.unwrap();
    assert_eq!(errors, json!({"name": ["This field is required."]}));

    let res = post_json(&client, srv.url("/api/zones/"), json!({"name": "   "})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let errors: Value = res.json().await.unwrap();
    assert_eq!(errors, json!({"name": ["This field may not be blank."]}));

    let res = client
        .post(srv.url("/api/zones/"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = post_json(&client, srv.url("/api/zones/"), json!({"name": "Cusco", "latitud": "abc"})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let errors: Value = res.json().await.unwrap();
    assert_eq!(errors, json!({"latitud": ["A valid number is required."]}));
}

#[tokio::test]
async fn coordinates_beyond_stored_precision_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = client();

    let res = post_json(&client, srv.url("/api/zones/"), json!({"name": "Far", "latitud": "1234.5"})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let errors: Value = res.json().await.unwrap();
    assert_eq!(
        errors,
        json!({"latitud": ["Ensure that there are no more than 3 digits before the decimal point."]})
    );

    let res = post_json(
        &client,
        srv.url("/api/zones/"),
        json!({"name": "Near", "longitud": "-13.1234567891"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let errors: Value = res.json().await.unwrap();
    assert_eq!(errors, json!({"longitud": ["Ensure that there are no more than 6 decimal places."]}));

    let zone = create(&client, &srv, "/api/zones/", json!({"name": "Cusco", "latitud": "-13.531950"})).await;
    assert_eq!(zone["latitud"], "-13.531950");

    let res = client
        .patch(srv.url("/api/zones/1/"))
        .json(&json!({"latitud": -1000}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let zones: Value = client.get(srv.url("/api/zones/")).send().await.unwrap().json().await.unwrap();
    assert_eq!(zones.as_array().map(Vec::len), Some(1));
    assert_eq!(zones[0]["latitud"], "-13.531950");
}

#[tokio::test]
async fn explicit_null_on_required_fields_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = client();
    create(&client, &srv, "/api/zones/", json!({"name": "Arequipa"})).await;

    for method in [reqwest::Method::PATCH, reqwest::Method::PUT] {
        let res = client
            .request(method, srv.url("/api/zones/1/"))
            .json(&json!({"name": null}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let errors: Value = res.json().await.unwrap();
        assert_eq!(errors, json!({"name": ["This field may not be null."]}));
    }

    let zone: Value = client.get(srv.url("/api/zones/1/")).send().await.unwrap().json().await.unwrap();
    assert_eq!(zone["name"], "Arequipa");
}

#[tokio::test]
async fn patch_null_clears_and_omitted_fields_survive() {
    let srv = TestServer::spawn().await;
    let client = client();
    create(
        &client,
        &srv,
        "/api/zones/",
        json!({"name": "Arequipa", "description": "ciudad blanca", "longitud": "-71.53"}),
    )
    .await;

    let patched: Value = client
        .patch(srv.url("/api/zones/1/"))
        .json(&json!({"description": null}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(patched["description"], Value::Null);
    assert_eq!(patched["name"], "Arequipa");
    assert_eq!(patched["longitud"], "-71.53");

    // PUT with only the required field keeps the optional ones.
    let put: Value = client
        .put(srv.url("/api/zones/1/"))
        .json(&json!({"name": "AQP"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(put["name"], "AQP");
    assert_eq!(put["longitud"], "-71.53");
}

#[tokio::test]
async fn tour_with_unknown_zone_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = client();
    let zone = create(&client, &srv, "/api/zones/", json!({"name": "Lima"})).await;

    let res = post_json(
        &client,
        srv.url("/api/tours/"),
        json!({"name": "Fantasma", "zonaSalida": zone["id"], "zonaLlegada": 99}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let tours: Value = client.get(srv.url("/api/tours/")).send().await.unwrap().json().await.unwrap();
    assert_eq!(tours, json!([]));
}

#[tokio::test]
async fn deleting_a_zone_removes_its_tours() {
    let srv = TestServer::spawn().await;
    let client = client();
    let a = create(&client, &srv, "/api/zones/", json!({"name": "A"})).await;
    let b = create(&client, &srv, "/api/zones/", json!({"name": "B"})).await;
    create(
        &client,
        &srv,
        "/api/tours/",
        json!({"name": "A-B", "zonaSalida": a["id"], "zonaLlegada": b["id"]}),
    )
    .await;

    let res = client
        .delete(srv.url(&format!("/api/zones/{}/", a["id"])))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let tours: Value = client.get(srv.url("/api/tours/")).send().await.unwrap().json().await.unwrap();
    assert_eq!(tours, json!([]));

    let res = client
        .delete(srv.url(&format!("/api/zones/{}/", a["id"])))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let srv = TestServer::spawn().await;
    let client = client();
    for path in ["/api/tours/abc/", "/api/zones/0/", "/api/users/-3/"] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
    }
}
