use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

pub(super) fn build_public_page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::pages::landing_handler))
        .route("/dashboard", get(handlers::pages::dashboard_handler))
        .route(
            "/track/{campaign_id}",
            get(handlers::pages::track_click_handler),
        )
        .route(
            "/awareness",
            get(handlers::pages::general_awareness_handler),
        )
        .route(
            "/awareness/{campaign_id}",
            get(handlers::pages::campaign_awareness_handler),
        )
        .route(
            "/external/login/{code}",
            get(handlers::pages::external_login_handler),
        )
        .route(
            "/api/report/{campaign_id}",
            post(handlers::interactions::report_phishing_handler),
        )
}
