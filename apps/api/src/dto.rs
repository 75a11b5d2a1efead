mod access;
mod campaigns;
mod common;
mod interactions;
mod users;

pub use access::{
    AccessGrantIssuedResponse, AccessGrantResponse, AccessUseResponse, AccessValidationResponse,
    CreateAccessGrantRequest,
};
pub use campaigns::{
    CampaignDispatchResponse, CampaignRecipientResponse, CampaignResponse, CreateCampaignRequest,
};
pub use common::{GenericMessageResponse, HealthDependencyStatus, HealthResponse};
pub use interactions::{InteractionResponse, ReportPhishingRequest, StatsResponse};
pub use users::{CreateUserRequest, UserResponse};
