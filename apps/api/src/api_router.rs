mod admin_api;
mod cors;
mod public_pages;

use axum::Router;
use axum::routing::get;
use phishwise_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(public_pages::build_public_page_routes())
        .merge(admin_api::build_admin_api_routes(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}

#[cfg(test)]
mod tests {
    use phishwise_core::AppError;

    use super::build_router;
    use crate::test_support::in_memory_state;

    #[tokio::test]
    async fn router_builds_with_valid_frontend_origin() {
        let state = in_memory_state(None);
        assert!(build_router(state, "http://localhost:5000").is_ok());
    }

    #[tokio::test]
    async fn router_rejects_unusable_frontend_origin() {
        let state = in_memory_state(None);
        assert!(matches!(
            build_router(state, "http://localhost:5000\n"),
            Err(AppError::Internal(_))
        ));
    }
}
