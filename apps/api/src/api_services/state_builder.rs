use std::sync::Arc;

use phishwise_application::{
    AccessGrantService, CampaignService, Clock, InteractionService, SystemClock, UserService,
};
use phishwise_infrastructure::{
    PostgresAccessGrantRepository, PostgresCampaignRepository, PostgresInteractionRepository,
    PostgresUserRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::base_url::BaseUrlResolver;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> AppState {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let campaign_repository = Arc::new(PostgresCampaignRepository::new(pool.clone()));
    let interaction_repository = Arc::new(PostgresInteractionRepository::new(pool.clone()));
    let access_grant_repository = Arc::new(PostgresAccessGrantRepository::new(pool.clone()));

    AppState {
        access_grant_service: AccessGrantService::new(
            access_grant_repository,
            campaign_repository.clone(),
            clock.clone(),
            config.use_policy,
        ),
        user_service: UserService::new(user_repository.clone(), clock.clone()),
        campaign_service: CampaignService::new(
            campaign_repository.clone(),
            user_repository.clone(),
            clock.clone(),
        ),
        interaction_service: InteractionService::new(
            interaction_repository,
            user_repository,
            campaign_repository,
            clock,
        ),
        base_url_resolver: BaseUrlResolver::new(
            config.public_base_url.as_ref(),
            config.fallback_base_url(),
        ),
        admin_api_token: config.admin_api_token.clone(),
        postgres_pool: pool,
    }
}
