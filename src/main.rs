//! DevConnector - social-profile API server
//! Mission: Accounts, profiles, and a member feed over JSON/HTTP

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use devconnector_backend::{
    auth::{TokenCodec, UserStore},
    build_router,
    config::Config,
    posts::PostStore,
    profile::{GithubClient, ProfileStore},
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    let config = Config::parse();

    info!("🚀 DevConnector API starting");

    let users = Arc::new(UserStore::new(&config.db_path, config.bcrypt_cost)?);
    let profiles = Arc::new(ProfileStore::new(&config.db_path)?);
    let posts = Arc::new(PostStore::new(&config.db_path)?);

    info!("📊 Database initialized at: {}", config.db_path);

    // Loaded once; never mutated after this point
    let tokens = Arc::new(TokenCodec::new(config.signing_secret()));

    let github = Arc::new(GithubClient::new(
        &config.github_api_url,
        config.github_client_id.clone(),
        config.github_client_secret.clone(),
        config.github_timeout(),
    )?);

    let state = AppState {
        users,
        profiles,
        posts,
        tokens,
        github,
        token_ttls: config.token_ttls(),
    };

    let app = build_router(state);

    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "devconnector_backend=debug,devconnector=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate root .env when launched from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
