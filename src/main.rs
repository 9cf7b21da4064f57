use std::net::SocketAddr;

use aegir_dashboard::config::AppConfig;
use aegir_dashboard::gateway::Credential;
use aegir_dashboard::{routes, AppState};
use mimalloc::MiMalloc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aegir_dashboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration (CONTENT_API_URL): {e}"))?;
    let state = AppState::new(config.clone())?;

    if let Some(token) = &config.content_api_token {
        state.session.install(Credential::static_token(token.clone())).await;
    } else if let (Some(email), Some(password)) =
        (&config.content_api_email, &config.content_api_password)
    {
        match state.client.login(email, password).await {
            Ok(credential) => state.session.install(credential).await,
            Err(e) => tracing::error!(error = %e, "Startup login to content API failed"),
        }
    } else {
        tracing::warn!("No content API credential configured; views require POST /api/v1/auth/login");
    }

    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set; session login and logout routes are disabled");
    }

    let host: std::net::IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((host, config.port));
    tracing::info!(host = %addr, content_api = %config.content_api_url, "Starting Aegir dashboard server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, routes::router(state)).await?;

    Ok(())
}
