use std::sync::Arc;

use papertrade::api::routes::{AppState, app_router};
use papertrade::persistence::{PgLedger, create_pool_and_migrate};
use papertrade::quotes::YahooQuotes;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("papertrade=info")),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL")?;
    let jwt_secret = std::env::var("JWT_SECRET")?;

    let pool = create_pool_and_migrate(&database_url).await?;
    let state = AppState {
        ledger: Arc::new(PgLedger::new(pool)),
        quotes: Arc::new(YahooQuotes::new()?),
        jwt_secret: jwt_secret.into_bytes(),
    };

    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on 0.0.0.0:3000");
    axum::serve(listener, app).await?;
    Ok(())
}
