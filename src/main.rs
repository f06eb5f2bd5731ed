use std::sync::Arc;
use storefront_rust::backend::{Caller, ServiceState, StoreBackend};
use storefront_rust::config::AppConfig;
use storefront_rust::router::create_app_router;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefront_rust=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Initialize service state
    let state = Arc::new(ServiceState::new(config.admins.iter().cloned()));

    if config.seed {
        match config.admins.first() {
            Some(admin) => {
                state
                    .connect(Caller::principal(admin.clone()))
                    .seed_default_products()
                    .await?
            }
            None => tracing::warn!("Seeding requested but no admin is configured"),
        }
    }

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    info!(addr = %config.bind_addr, "Server running");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
