//! Entry point: load config, wire dependencies, and run the server.

use account_auth::auth::{PasswordHasher, TokenIssuer};
use account_auth::config::Config;
use account_auth::db::{self, PgUserStore};
use account_auth::{create_app, AccountService, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;
    let store = Arc::new(PgUserStore::new(db_pool));

    let hasher = PasswordHasher::new(config.hash_params)
        .map_err(|e| anyhow::anyhow!("password hasher: {}", e))?;
    let tokens = TokenIssuer::new(config.jwt_secret.as_bytes());
    let accounts = AccountService::new(store, hasher, tokens, config.token_ttl);

    let app = create_app(AppState::new(accounts));

    tracing::info!(
        addr = %config.server_addr,
        token_ttl_secs = config.token_ttl.num_seconds(),
        "listening"
    );
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
