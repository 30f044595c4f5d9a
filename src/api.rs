//! JSON endpoints for listings and seat booking.

use crate::error::{AppError, Result};
use crate::models::{Booking, Language, Movie, NewBooking, Show};
use crate::server::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ShowDetail {
    #[serde(flatten)]
    pub show: Show,
    pub movie_title: String,
    pub label: String,
    pub seats_remaining: i64,
}

pub async fn list_languages(State(state): State<AppState>) -> Result<Json<Vec<Language>>> {
    Ok(Json(state.db.list_languages().await?))
}

pub async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<Movie>>> {
    Ok(Json(state.db.list_movies().await?))
}

pub async fn show_detail(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<ShowDetail>> {
    let Path(id) = path?;
    let show = state.db.get_show(id).await?.ok_or(AppError::NotFound)?;
    let movie = state
        .db
        .get_movie(show.movie_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let seats_remaining = state.db.seats_remaining(show.id).await?;

    Ok(Json(ShowDetail {
        label: show.label(&movie),
        show,
        movie_title: movie.title,
        seats_remaining,
    }))
}

/// Book seats for a show: 201 on success, 409 when not enough seats remain
pub async fn book_show(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<NewBooking>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>)> {
    let Path(id) = path?;
    let Json(request) = body?;
    let booking = state.db.book_seats(id, &request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}
