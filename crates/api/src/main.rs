//! Standalone handshake server over in-memory stores.

#![allow(clippy::expect_used)]

use std::{sync::Arc, time::Duration};

use clap::Parser;
use keygate_api::{router, AppState};
use keygate_authn::{ApiKeyAuthenticator, AuthConfig};
use keygate_storage::auth::{MemoryApiKeyStore, MemoryChallengeStore};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

/// API key handshake server
#[derive(Parser, Debug)]
#[command(name = "keygate")]
#[command(about = "Challenge/response authentication server for API keys")]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "KEYGATE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "KEYGATE_PORT")]
    port: u16,

    /// HMAC secret for bearer tokens
    #[arg(long, env = "KEYGATE_TOKEN_SECRET", hide_env_values = true)]
    token_secret: String,

    /// Challenge time-to-live in seconds
    #[arg(long, default_value = "60", env = "KEYGATE_CHALLENGE_TTL_SECS")]
    challenge_ttl_secs: u64,

    /// Bearer token time-to-live in seconds
    #[arg(long, default_value = "4000", env = "KEYGATE_TOKEN_TTL_SECS")]
    token_ttl_secs: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let config = AuthConfig::builder()
        .token_secret(Zeroizing::new(args.token_secret))
        .challenge_ttl(Duration::from_secs(args.challenge_ttl_secs))
        .token_ttl(Duration::from_secs(args.token_ttl_secs))
        .build();

    let auth = ApiKeyAuthenticator::new(
        Arc::new(MemoryApiKeyStore::new()),
        Arc::new(MemoryChallengeStore::new()),
        config,
    );
    let app = router(Arc::new(AppState { auth }));

    let addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&addr).await.expect("bind listener");
    info!(%addr, "keygate listening");

    axum::serve(listener, app).await.expect("server error");
}
