use anyhow::Context;
use book_recommender::{AwsCredentials, ProcessEnv};
use recommendation_service::{RECOMMENDATIONS_PATH, ServiceConfig, create_app, init_tracing};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_level, config.log_format);

    // Credentials are re-read per request; this only flags an obviously broken setup early.
    if let Err(e) = AwsCredentials::resolve(&ProcessEnv) {
        warn!("{e}; recommendation requests will fail until it is set");
    }

    info!(
        model = %config.generation.model_id,
        tiers = ?config.profile.tiers,
        count = config.profile.count,
        locale = ?config.locale,
        "Recommendation pipeline configured"
    );

    let app = create_app(&config);
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    let addr = listener.local_addr()?;

    info!("Book Recommendation Service starting on {}", addr);
    info!("Service description available at http://{}/", addr);
    info!("Health check endpoint: http://{}/health", addr);
    info!("Recommendation endpoint: POST http://{}{}", addr, RECOMMENDATIONS_PATH);

    axum::serve(listener, app).await?;

    Ok(())
}
