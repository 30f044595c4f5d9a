use crate::error::{AppError, Result};
use crate::html::{escape, format_price, page};
use crate::server::AppState;
use crate::urls::reverse_with;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

/// Landing page listing every movie
pub async fn home(State(state): State<AppState>) -> Result<Html<String>> {
    let movies = state.db.list_movies().await?;
    let languages: HashMap<i64, String> = state
        .db
        .list_languages()
        .await?
        .into_iter()
        .map(|l| (l.id, l.name))
        .collect();

    let body = if movies.is_empty() {
        "<p>No movies are showing right now.</p>".to_string()
    } else {
        let items: String = movies
            .iter()
            .map(|movie| {
                let href = reverse_with("movie_detail", &[&movie.id.to_string()]).unwrap_or_default();
                let language = languages
                    .get(&movie.language_id)
                    .map(String::as_str)
                    .unwrap_or("Unknown");
                format!(
                    "<li><a href=\"{}\">{}</a> ({} min, {})</li>\n",
                    escape(&href),
                    escape(&movie.title),
                    movie.duration_minutes,
                    escape(language)
                )
            })
            .collect();
        format!("<ul class=\"movies\">\n{}</ul>", items)
    };

    Ok(page(&state.config.site_name, "Now Showing", &body))
}

/// Movie page with its shows and remaining seats
pub async fn movie_detail(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Html<String>> {
    let Path(id) = path?;
    let movie = state.db.get_movie(id).await?.ok_or(AppError::NotFound)?;
    let language = state
        .db
        .get_language(movie.language_id)
        .await?
        .map(|l| l.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let mut body = format!(
        "<p>{}</p>\n<p>{} min &middot; {}</p>\n",
        escape(&movie.description),
        movie.duration_minutes,
        escape(&language)
    );

    let shows = state.db.list_shows_for_movie(movie.id).await?;
    if shows.is_empty() {
        body.push_str("<p>No shows scheduled.</p>");
    } else {
        body.push_str("<table class=\"shows\">\n<tr><th>When</th><th>Screen</th><th>Price</th><th>Seats left</th></tr>\n");
        for show in &shows {
            let remaining = state.db.seats_remaining(show.id).await?;
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                show.starts_at.format("%Y-%m-%d %H:%M UTC"),
                escape(&show.screen),
                format_price(show.price_cents),
                if remaining > 0 {
                    remaining.to_string()
                } else {
                    "Sold out".to_string()
                }
            ));
        }
        body.push_str("</table>");
    }

    Ok(page(&state.config.site_name, &movie.title, &body))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Fallback for unmatched routes
pub async fn not_found(State(state): State<AppState>, uri: Uri) -> Response {
    debug!("No route for {}", uri.path());
    let body = format!(
        "<p>Nothing lives at <code>{}</code>.</p>",
        escape(uri.path())
    );
    (
        StatusCode::NOT_FOUND,
        page(&state.config.site_name, "Page not found", &body),
    )
        .into_response()
}
