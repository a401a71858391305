use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};

use tours_auth::SessionValidator;

use crate::app::services::AppServices;
use crate::context::SessionContext;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sessionid";

/// Resolve the caller's session and attach it to the request.
///
/// Never rejects: a missing, expired or forged token just leaves the request
/// anonymous. Gating happens per route with [`require_login`].
pub async fn session_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let session = resolve_session(&services.sessions, req.headers(), Utc::now());
    req.extensions_mut().insert(session);
    next.run(req).await
}

/// Redirect anonymous callers to the login page, remembering where they were going.
pub async fn require_login(
    Extension(session): Extension<SessionContext>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if session.is_authenticated() {
        return next.run(req).await;
    }
    let target = format!("/login/?next={}", req.uri().path());
    Redirect::to(&target).into_response()
}

pub fn resolve_session(
    validator: &dyn SessionValidator,
    headers: &HeaderMap,
    now: DateTime<Utc>,
) -> SessionContext {
    let Some(token) = extract_bearer(headers).or_else(|| extract_cookie(headers, SESSION_COOKIE))
    else {
        return SessionContext::anonymous();
    };

    match validator.validate(token, now) {
        Ok(claims) => SessionContext::authenticated(claims.principal()),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid session token");
            SessionContext::anonymous()
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}
