use anyhow::Context;

use botthef_admin::app::{router, AppState};
use botthef_admin::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "botthef_admin=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("Starting admin API...");

    let config = AppConfig::from_env();
    tracing::info!(
        "Environment '{}', region {}, tables '{}'/'{}', bucket '{}'",
        config.env,
        config.aws_region,
        config.blog_table,
        config.playbook_table,
        config.s3_bucket
    );

    if config.auth.admin_email.is_empty() {
        tracing::warn!("ADMIN_EMAIL is not set; every signed token will be rejected");
    }

    let state = AppState::from_config(&config)
        .await
        .context("Failed to initialize application state")?;

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
