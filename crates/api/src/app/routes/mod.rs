use axum::{routing::get, Router};

pub mod auth;
pub mod common;
pub mod pages;
pub mod system;
pub mod tours;
pub mod users;
pub mod zones;

/// REST resources plus the login/logout pages. The index page is wired
/// separately because it sits behind the login gate.
pub fn router() -> Router {
    Router::new()
        .route("/api/", get(system::api_root))
        .merge(users::router())
        .merge(zones::router())
        .merge(tours::router())
        .route("/api/auth/login/", get(auth::login_page).post(auth::login))
        .route("/api/auth/logout/", get(auth::logout))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/login/", get(auth::login_page).post(auth::login))
        .route("/logout/", get(auth::logout))
}
