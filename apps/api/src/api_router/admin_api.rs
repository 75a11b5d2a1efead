use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};

use crate::state::AppState;
use crate::{handlers, middleware};

pub(super) fn build_admin_api_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/external/access",
            post(handlers::access::issue_access_grant_handler),
        )
        .route(
            "/api/external/validate/{code}",
            get(handlers::access::validate_access_handler),
        )
        .route(
            "/api/external/use/{code}",
            post(handlers::access::record_access_use_handler),
        )
        .route(
            "/api/external/revoke/{code}",
            post(handlers::access::revoke_access_handler),
        )
        .route(
            "/api/external/access-list",
            get(handlers::access::list_access_grants_handler),
        )
        .route(
            "/api/users",
            get(handlers::users::list_users_handler).post(handlers::users::create_user_handler),
        )
        .route(
            "/api/campaigns",
            get(handlers::campaigns::list_campaigns_handler)
                .post(handlers::campaigns::create_campaign_handler),
        )
        .route(
            "/api/send-campaign/{campaign_id}",
            post(handlers::campaigns::send_campaign_handler),
        )
        .route("/api/stats", get(handlers::interactions::stats_handler))
        .route(
            "/api/user-responses",
            get(handlers::interactions::list_interactions_handler),
        )
        .route(
            "/api/export-visitors",
            get(handlers::interactions::export_interactions_handler),
        )
        .route_layer(from_fn_with_state(
            app_state,
            middleware::require_admin_token,
        ))
}
