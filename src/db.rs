use crate::error::{AppError, Result};
use crate::models::{
    clean_language_name, Booking, Language, Movie, NewBooking, NewMovie, NewShow, Show,
};
use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

/// How long an admin login stays valid
const ADMIN_SESSION_HOURS: i64 = 12;

/// Record counts shown on the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub languages: i64,
    pub movies: i64,
    pub shows: i64,
    pub bookings: i64,
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a connection pool and create tables
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        use anyhow::Context;

        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` is a separate database, so keep exactly one alive.
        let in_memory = database_url.contains(":memory:");
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database at {}", database_url))?;

        let db = Self { pool };
        db.create_tables().await.context("Failed to create tables")?;

        info!("Database ready ({})", if in_memory { "in-memory" } else { database_url });
        Ok(db)
    }

    async fn create_tables(&self) -> Result<()> {
        let statements = [
            "CREATE TABLE IF NOT EXISTS languages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            )",
            "CREATE TABLE IF NOT EXISTS movies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
                language_id INTEGER NOT NULL REFERENCES languages(id),
                created_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS shows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                movie_id INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
                starts_at TEXT NOT NULL,
                screen TEXT NOT NULL,
                total_seats INTEGER NOT NULL CHECK (total_seats > 0),
                price_cents INTEGER NOT NULL CHECK (price_cents >= 0)
            )",
            "CREATE TABLE IF NOT EXISTS bookings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                show_id INTEGER NOT NULL REFERENCES shows(id) ON DELETE CASCADE,
                customer_name TEXT NOT NULL,
                customer_email TEXT NOT NULL,
                seats INTEGER NOT NULL CHECK (seats > 0),
                created_at TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_bookings_show_id ON bookings(show_id)",
            "CREATE TABLE IF NOT EXISTS admin_sessions (
                key TEXT PRIMARY KEY,
                expires_at INTEGER NOT NULL
            )",
        ];

        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ==================== Languages ====================

    pub async fn create_language(&self, name: &str) -> Result<Language> {
        let name = clean_language_name(name)?;

        let result = sqlx::query_as::<_, Language>(
            "INSERT INTO languages (name) VALUES (?1) RETURNING id, name",
        )
        .bind(&name)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(language) => Ok(language),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                AppError::Validation(format!("language '{}' already exists", name)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_language(&self, id: i64) -> Result<Option<Language>> {
        let language = sqlx::query_as::<_, Language>("SELECT id, name FROM languages WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(language)
    }

    pub async fn list_languages(&self) -> Result<Vec<Language>> {
        let languages =
            sqlx::query_as::<_, Language>("SELECT id, name FROM languages ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(languages)
    }

    // ==================== Movies ====================

    pub async fn create_movie(&self, movie: &NewMovie) -> Result<Movie> {
        movie.validate()?;

        if self.get_language(movie.language_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "unknown language id {}",
                movie.language_id
            )));
        }

        let created = sqlx::query_as::<_, Movie>(
            "INSERT INTO movies (title, description, duration_minutes, language_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, title, description, duration_minutes, language_id, created_at",
        )
        .bind(movie.title.trim())
        .bind(&movie.description)
        .bind(movie.duration_minutes)
        .bind(movie.language_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get_movie(&self, id: i64) -> Result<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            "SELECT id, title, description, duration_minutes, language_id, created_at
             FROM movies WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(movie)
    }

    pub async fn list_movies(&self) -> Result<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            "SELECT id, title, description, duration_minutes, language_id, created_at
             FROM movies ORDER BY title",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    // ==================== Shows ====================

    pub async fn create_show(&self, show: &NewShow) -> Result<Show> {
        show.validate()?;

        if self.get_movie(show.movie_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "unknown movie id {}",
                show.movie_id
            )));
        }

        let created = sqlx::query_as::<_, Show>(
            "INSERT INTO shows (movie_id, starts_at, screen, total_seats, price_cents)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, movie_id, starts_at, screen, total_seats, price_cents",
        )
        .bind(show.movie_id)
        .bind(show.starts_at)
        .bind(show.screen.trim())
        .bind(show.total_seats)
        .bind(show.price_cents)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get_show(&self, id: i64) -> Result<Option<Show>> {
        let show = sqlx::query_as::<_, Show>(
            "SELECT id, movie_id, starts_at, screen, total_seats, price_cents
             FROM shows WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(show)
    }

    /// Shows for a movie, earliest first
    pub async fn list_shows_for_movie(&self, movie_id: i64) -> Result<Vec<Show>> {
        let shows = sqlx::query_as::<_, Show>(
            "SELECT id, movie_id, starts_at, screen, total_seats, price_cents
             FROM shows WHERE movie_id = ?1 ORDER BY starts_at",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(shows)
    }

    /// Seats not yet booked for a show. Unknown shows are `NotFound`.
    pub async fn seats_remaining(&self, show_id: i64) -> Result<i64> {
        let remaining: Option<i64> = sqlx::query_scalar(
            "SELECT s.total_seats - COALESCE((SELECT SUM(b.seats) FROM bookings b WHERE b.show_id = s.id), 0)
             FROM shows s WHERE s.id = ?1",
        )
        .bind(show_id)
        .fetch_optional(&self.pool)
        .await?;

        remaining.ok_or(AppError::NotFound)
    }

    // ==================== Bookings ====================

    /// Book seats for a show.
    ///
    /// The capacity check and the insert are a single statement, so concurrent
    /// requests can never push the booked total past `total_seats`.
    pub async fn book_seats(&self, show_id: i64, booking: &NewBooking) -> Result<Booking> {
        booking.validate()?;

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (show_id, customer_name, customer_email, seats, created_at)
             SELECT ?1, ?2, ?3, ?4, ?5
             WHERE (
                 SELECT s.total_seats - COALESCE((SELECT SUM(b.seats) FROM bookings b WHERE b.show_id = s.id), 0)
                 FROM shows s WHERE s.id = ?1
             ) >= ?4
             RETURNING id, show_id, customer_name, customer_email, seats, created_at",
        )
        .bind(show_id)
        .bind(booking.customer_name.trim())
        .bind(booking.customer_email.trim())
        .bind(booking.seats)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        match inserted {
            Some(created) => {
                tx.commit().await?;
                info!("Booked {} seat(s) for show {}", created.seats, show_id);
                Ok(created)
            }
            None => {
                let remaining: Option<i64> = sqlx::query_scalar(
                    "SELECT s.total_seats - COALESCE((SELECT SUM(b.seats) FROM bookings b WHERE b.show_id = s.id), 0)
                     FROM shows s WHERE s.id = ?1",
                )
                .bind(show_id)
                .fetch_optional(&mut *tx)
                .await?;
                tx.rollback().await?;

                match remaining {
                    None => Err(AppError::NotFound),
                    Some(remaining) => Err(AppError::SoldOut {
                        requested: booking.seats,
                        remaining,
                    }),
                }
            }
        }
    }

    pub async fn list_bookings_for_show(&self, show_id: i64) -> Result<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT id, show_id, customer_name, customer_email, seats, created_at
             FROM bookings WHERE show_id = ?1 ORDER BY id",
        )
        .bind(show_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    pub async fn counts(&self) -> Result<Counts> {
        let (languages, movies, shows, bookings): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM languages),
                (SELECT COUNT(*) FROM movies),
                (SELECT COUNT(*) FROM shows),
                (SELECT COUNT(*) FROM bookings)",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(Counts {
            languages,
            movies,
            shows,
            bookings,
        })
    }

    // ==================== Admin Sessions ====================

    /// Create a new admin session and return its key
    pub async fn create_admin_session(&self) -> Result<String> {
        let expires_at = (Utc::now() + Duration::hours(ADMIN_SESSION_HOURS)).timestamp();

        // Drop expired sessions while we're here
        sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= ?1")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?;

        let key: String = sqlx::query_scalar(
            "INSERT INTO admin_sessions (key, expires_at)
             VALUES (lower(hex(randomblob(32))), ?1)
             RETURNING key",
        )
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(key)
    }

    pub async fn is_admin_session_valid(&self, key: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM admin_sessions WHERE key = ?1 AND expires_at > ?2",
        )
        .bind(key)
        .bind(Utc::now().timestamp())
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn delete_admin_session(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM admin_sessions WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
