use exo_predictor::{config::Config, server, ModelState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exo_predictor=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(path = %config.model_path.display(), "loading model");

    // One-time blocking load; on failure keep serving and refuse predictions.
    let model = ModelState::load(&config.model_path);
    if let ModelState::Unavailable { reason } = &model {
        tracing::warn!("starting without a model, predictions will fail: {}", reason);
    }

    let app = server::router(server::AppState::new(model));

    let addr = std::net::SocketAddr::from((config.bind_addr, config.port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
