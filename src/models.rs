use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A spoken language a movie can be screened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Language {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: i64,
    pub language_id: i64,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// A single screening of a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Show {
    pub id: i64,
    pub movie_id: i64,
    pub starts_at: DateTime<Utc>,
    pub screen: String,
    pub total_seats: i64,
    pub price_cents: i64,
}

impl Show {
    /// Label used when the show is listed alongside its movie.
    pub fn label(&self, movie: &Movie) -> String {
        format!("{} @ {}", movie.title, self.starts_at.to_rfc3339())
    }
}

impl fmt::Display for Show {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Show #{} on {}", self.id, self.screen)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Booking {
    pub id: i64,
    pub show_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub seats: i64,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Booking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.customer_name, self.seats)
    }
}

// ==================== Creation Payloads ====================

#[derive(Debug, Clone, Deserialize)]
pub struct NewMovie {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: i64,
    pub language_id: i64,
}

impl NewMovie {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("movie title must not be empty".into()));
        }
        if self.duration_minutes <= 0 {
            return Err(AppError::Validation("movie duration must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewShow {
    pub movie_id: i64,
    pub starts_at: DateTime<Utc>,
    pub screen: String,
    pub total_seats: i64,
    pub price_cents: i64,
}

impl NewShow {
    pub fn validate(&self) -> Result<()> {
        if self.screen.trim().is_empty() {
            return Err(AppError::Validation("screen must not be empty".into()));
        }
        if self.total_seats <= 0 {
            return Err(AppError::Validation("a show needs at least one seat".into()));
        }
        if self.price_cents < 0 {
            return Err(AppError::Validation("price must not be negative".into()));
        }
        Ok(())
    }
}

/// Booking request body; the show comes from the URL.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub customer_name: String,
    pub customer_email: String,
    pub seats: i64,
}

impl NewBooking {
    pub fn validate(&self) -> Result<()> {
        if self.customer_name.trim().is_empty() {
            return Err(AppError::Validation("customer name must not be empty".into()));
        }
        if !self.customer_email.contains('@') {
            return Err(AppError::Validation("customer email is invalid".into()));
        }
        if self.seats < 1 {
            return Err(AppError::Validation("at least one seat must be booked".into()));
        }
        Ok(())
    }
}

/// Validate and normalize a language name before it is stored.
pub fn clean_language_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("language name must not be empty".into()));
    }
    Ok(name.to_string())
}
