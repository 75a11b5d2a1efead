//! PhishWise API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod base_url;
mod demo_seed;
mod dto;
mod error;
mod handlers;
mod middleware;
mod pages;
mod state;
#[cfg(test)]
mod test_support;

use phishwise_core::AppError;
use tracing::info;

use crate::api_config::ApiConfig;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;
    let pool = api_services::connect_and_migrate(&config.database_url).await?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let app_state = api_services::build_app_state(pool, &config);

    if config.seed_demo_data {
        demo_seed::run(&app_state).await?;
    }

    let app = api_router::build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind API listener: {error}")))?;

    info!(
        %address,
        use_policy = config.use_policy.as_str(),
        admin_token = config.admin_api_token.is_some(),
        "phishwise-api listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
