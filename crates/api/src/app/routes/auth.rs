//! Login/logout for the index page.

use std::sync::Arc;

use axum::{
    extract::{Extension, Form, Query},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;

use tours_auth::{Principal, verify_password};

use crate::app::errors::json_error;
use crate::app::routes::pages::render_login;
use crate::app::services::AppServices;
use crate::middleware::SESSION_COOKIE;

pub const LOGIN_FAILED_MESSAGE: &str = "Please enter a correct username and password.";

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

fn session_cookie(value: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    Html(render_login(safe_next(query.next.as_deref()), None))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = safe_next(form.next.as_deref()).to_string();

    let principal = match authenticate(&services, &form.username, form.password).await {
        Ok(Some(principal)) => principal,
        Ok(None) => {
            tracing::info!(username = %form.username, "login rejected");
            return (
                StatusCode::UNAUTHORIZED,
                Html(render_login(&next, Some(LOGIN_FAILED_MESSAGE))),
            )
                .into_response();
        }
        Err(resp) => return resp,
    };

    let token = match services.sessions.issue(&principal, Utc::now()) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to issue session token");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "A server error occurred.");
        }
    };

    tracing::info!(username = %principal.username, "login succeeded");
    let cookie = session_cookie(&token, services.sessions.ttl().num_seconds());
    ([(header::SET_COOKIE, cookie)], Redirect::to(&next)).into_response()
}

pub async fn logout() -> Response {
    ([(header::SET_COOKIE, session_cookie("", 0))], Redirect::to("/login")).into_response()
}

async fn authenticate(
    services: &AppServices,
    username: &str,
    password: String,
) -> Result<Option<Principal>, Response> {
    let account = match services.accounts.find_by_username(username).await {
        Ok(Some(account)) => account,
        Ok(None) => return Ok(None),
        Err(e) => {
            tracing::error!(error = %e, "account lookup failed");
            return Err(json_error(StatusCode::INTERNAL_SERVER_ERROR, "A server error occurred."));
        }
    };

    let hash = account.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await;
    match verified {
        Ok(Ok(true)) => Ok(Some(Principal::new(account.id, account.username))),
        Ok(Ok(false)) => Ok(None),
        Ok(Err(e)) => {
            tracing::error!(error = %e, username = %account.username, "stored password hash unusable");
            Ok(None)
        }
        Err(e) => {
            tracing::error!(error = %e, "password verification task failed");
            Err(json_error(StatusCode::INTERNAL_SERVER_ERROR, "A server error occurred."))
        }
    }
}
