use phishwise_application::{
    AccessGrantService, CampaignService, InteractionService, UserService,
};
use sqlx::PgPool;

use crate::base_url::BaseUrlResolver;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_grant_service: AccessGrantService,
    pub user_service: UserService,
    pub campaign_service: CampaignService,
    pub interaction_service: InteractionService,
    pub base_url_resolver: BaseUrlResolver,
    pub admin_api_token: Option<String>,
    pub postgres_pool: PgPool,
}
