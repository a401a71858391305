//! Server-rendered HTML: the index listing and the login form.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::Extension;
use axum::response::Html;

use tours_catalog::{Tour, Zone};

use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::context::SessionContext;

const PAGE_HEAD: &str = "<!DOCTYPE html>\n<html lang=\"es\">\n<head><meta charset=\"utf-8\"><title>Tours</title></head>\n<body>\n";
const PAGE_TAIL: &str = "</body>\n</html>\n";

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub async fn index(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Html<String>> {
    let tours = services.records.list_tours().await?;
    let zones = services.records.list_zones().await?;
    let username = session.principal().map(|p| p.username.as_str()).unwrap_or_default();
    Ok(Html(render_index(username, &tours, &zones)))
}

pub fn render_index(username: &str, tours: &[Tour], zones: &[Zone]) -> String {
    let mut page = String::from(PAGE_HEAD);
    let _ = writeln!(
        page,
        "<p>Hola, {} <a href=\"/logout/\">Salir</a></p>",
        escape_html(username)
    );

    page.push_str("<h1>Tours</h1>\n<ul>\n");
    for tour in tours {
        let _ = writeln!(page, "<li>{}</li>", escape_html(&tour.name));
    }
    page.push_str("</ul>\n<h1>Zonas</h1>\n<ul>\n");
    for zone in zones {
        let _ = match &zone.description {
            Some(description) => writeln!(
                page,
                "<li>{}: {}</li>",
                escape_html(&zone.name),
                escape_html(description)
            ),
            None => writeln!(page, "<li>{}</li>", escape_html(&zone.name)),
        };
    }
    page.push_str("</ul>\n");
    page.push_str(PAGE_TAIL);
    page
}

pub fn render_login(next: &str, error: Option<&str>) -> String {
    let mut page = String::from(PAGE_HEAD);
    page.push_str("<h1>Iniciar sesión</h1>\n");
    if let Some(error) = error {
        let _ = writeln!(page, "<p class=\"error\">{}</p>", escape_html(error));
    }
    let _ = write!(
        page,
        "<form method=\"post\" action=\"/login/\">\n\
         <label>Usuario <input type=\"text\" name=\"username\" autofocus></label>\n\
         <label>Contraseña <input type=\"password\" name=\"password\"></label>\n\
         <input type=\"hidden\" name=\"next\" value=\"{}\">\n\
         <button type=\"submit\">Entrar</button>\n\
         </form>\n",
        escape_html(next)
    );
    page.push_str(PAGE_TAIL);
    page
}
