use crate::config::Config;
use crate::db::Database;
use crate::{admin, api, urls, views};
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        Self {
            config: Arc::new(config),
            db,
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Pages
        .route(urls::HOME, get(views::home))
        .route(urls::MOVIE_DETAIL, get(views::movie_detail))
        .route(urls::HEALTH, get(views::health))
        // JSON API
        .route(urls::API_LANGUAGES, get(api::list_languages))
        .route(urls::API_MOVIES, get(api::list_movies))
        .route(urls::API_SHOW, get(api::show_detail))
        .route(urls::API_BOOK_SHOW, post(api::book_show))
        // Admin
        .route(urls::ADMIN_INDEX, get(admin::index))
        .route(urls::ADMIN_LOGIN, get(admin::login_form).post(admin::login))
        .route(urls::ADMIN_LOGOUT, post(admin::logout))
        .route(urls::ADMIN_ADD_LANGUAGE, post(admin::add_language))
        .fallback(views::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the application until Ctrl+C
pub async fn serve(config: Config, db: Database) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    if config.admin_token.is_none() {
        info!("ADMIN_TOKEN not set, admin login is disabled");
    }

    let app = build_router(AppState::new(config, db));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("✓ Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
