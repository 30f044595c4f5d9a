use anyhow::Result;
use movie_ticket_booking::{config::Config, db::Database, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when not present)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("movie_ticket_booking=info".parse()?),
        )
        .init();

    info!("Starting movie ticket booking server");

    // Load configuration from environment
    let config = Config::from_env()?;

    let db = Database::connect(&config.database_url).await?;

    server::serve(config, db).await
}
