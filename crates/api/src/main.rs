use anyhow::Context;

use oneclick_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    oneclick_observability::init();

    let config = ApiConfig::from_env();

    let app = oneclick_api::app::build_app(&config)
        .await
        .context("failed to build services")?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        price_digits = config.price_digits.get(),
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
