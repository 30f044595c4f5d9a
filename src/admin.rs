//! Admin area: token login, dashboard, and language management.
//!
//! Unauthenticated requests are redirected (302) to the login page, which
//! returns the user to the page they asked for once the token is accepted.

use crate::error::{AppError, Result};
use crate::html::{escape, page};
use crate::security::{
    cookie_value, expired_session_cookie, session_cookie, verify_admin_token, SESSION_COOKIE,
};
use crate::server::AppState;
use crate::urls;
use axum::async_trait;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, FromRequestParts, Query, State};
use axum::http::request::Parts;
use axum::http::{header, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tracing::{info, warn};

/// Extractor that only succeeds for requests with a valid admin session
pub struct AdminSession {
    pub key: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        // Only GET targets can be revisited after login
        let next = if parts.method == Method::GET {
            parts.uri.path().to_string()
        } else {
            urls::ADMIN_INDEX.to_string()
        };

        let key = match cookie_value(&parts.headers, SESSION_COOKIE) {
            Some(key) => key.to_string(),
            None => return Err(AppError::Unauthorized { next }),
        };

        if state.db.is_admin_session_valid(&key).await? {
            Ok(AdminSession { key })
        } else {
            Err(AppError::Unauthorized { next })
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub token: String,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageForm {
    pub name: String,
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn render_login(state: &AppState, next: &str, error: Option<&str>) -> Html<String> {
    let mut body = String::new();
    if state.config.admin_token.is_none() {
        body.push_str("<p class=\"notice\">Admin login is disabled on this server.</p>\n");
    }
    if let Some(error) = error {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", escape(error)));
    }
    body.push_str(&format!(
        "<form method=\"post\" action=\"{}\">\n\
         <input type=\"hidden\" name=\"next\" value=\"{}\">\n\
         <label>Token <input type=\"password\" name=\"token\"></label>\n\
         <button type=\"submit\">Log in</button>\n</form>",
        urls::ADMIN_LOGIN,
        escape(next)
    ));
    page(&state.config.site_name, "Admin login", &body)
}

pub async fn login_form(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Html<String> {
    render_login(&state, urls::safe_next(query.next.as_deref()), None)
}

pub async fn login(
    State(state): State<AppState>,
    form: std::result::Result<Form<LoginForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form?;
    let next = urls::safe_next(form.next.as_deref());

    if !verify_admin_token(state.config.admin_token.as_deref(), &form.token) {
        warn!("Rejected admin login attempt");
        return Ok(render_login(&state, next, Some("Invalid token.")).into_response());
    }

    let key = state.db.create_admin_session().await?;
    info!("Admin logged in");

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, next.to_string()),
            (header::SET_COOKIE, session_cookie(&key)),
        ],
    )
        .into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    session: Option<AdminSession>,
) -> Result<Response> {
    if let Some(session) = session {
        state.db.delete_admin_session(&session.key).await?;
        info!("Admin logged out");
    }

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, urls::ADMIN_LOGIN.to_string()),
            (header::SET_COOKIE, expired_session_cookie()),
        ],
    )
        .into_response())
}

/// Dashboard with record counts and the language list
pub async fn index(_session: AdminSession, State(state): State<AppState>) -> Result<Html<String>> {
    let counts = state.db.counts().await?;
    let languages = state.db.list_languages().await?;

    let language_items: String = languages
        .iter()
        .map(|l| format!("<li>{}</li>\n", escape(&l.to_string())))
        .collect();

    let body = format!(
        "<table class=\"counts\">\n\
         <tr><th>Languages</th><td>{}</td></tr>\n\
         <tr><th>Movies</th><td>{}</td></tr>\n\
         <tr><th>Shows</th><td>{}</td></tr>\n\
         <tr><th>Bookings</th><td>{}</td></tr>\n</table>\n\
         <h2>Languages</h2>\n<ul class=\"languages\">\n{}</ul>\n\
         <form method=\"post\" action=\"{}\">\n\
         <label>Name <input type=\"text\" name=\"name\"></label>\n\
         <button type=\"submit\">Add language</button>\n</form>\n\
         <form method=\"post\" action=\"{}\"><button type=\"submit\">Log out</button></form>",
        counts.languages,
        counts.movies,
        counts.shows,
        counts.bookings,
        language_items,
        urls::ADMIN_ADD_LANGUAGE,
        urls::ADMIN_LOGOUT,
    );

    Ok(page(&state.config.site_name, "Site administration", &body))
}

pub async fn add_language(
    _session: AdminSession,
    State(state): State<AppState>,
    form: std::result::Result<Form<LanguageForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form?;
    let language = state.db.create_language(&form.name).await?;
    info!("Admin added language {}", language);
    Ok(found(urls::ADMIN_INDEX))
}
