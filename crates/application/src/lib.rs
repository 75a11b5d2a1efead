//! Application services and ports.

#![forbid(unsafe_code)]

mod access_grant_ports;
mod access_grant_service;
mod campaign_service;
mod clock;
mod interaction_service;
#[cfg(test)]
mod test_support;
mod training_ports;
mod user_service;

pub use access_grant_ports::{
    AccessCodeGenerator, AccessGrantListing, AccessGrantRepository, RandomAccessCodeGenerator,
    RecordUseOutcome, UsePolicy,
};
pub use access_grant_service::{
    AccessGrantService, AccessValidation, IssueAccessGrantInput, IssuedAccessGrant,
    RedeemedAccess, ValidAccess, external_login_url,
};
pub use campaign_service::{CampaignDispatch, CampaignRecipient, CampaignService, tracking_url};
pub use clock::{Clock, SystemClock};
pub use interaction_service::{
    INTERACTIONS_PAGE_SIZE, InteractionService, TrainingStats, interactions_to_csv,
};
pub use training_ports::{
    CampaignRepository, InteractionCounts, InteractionFilter, InteractionListing,
    InteractionRepository, UserRepository,
};
pub use user_service::UserService;
