use fraudguard_runtime::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.observability.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    fraudguard_server::run(config).await
}
