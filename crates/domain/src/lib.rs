//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access_grant;
mod campaign;
mod interaction;
mod user;

pub use access_grant::{
    ACCESS_CODE_ALPHABET, ACCESS_CODE_LENGTH, AccessCode, AccessGrant, GrantRejection,
    GrantStatus,
};
pub use campaign::{
    Campaign, CampaignId, CampaignStatus, DifficultyLevel, NewCampaign, PhishingType,
    TRACKING_URL_PLACEHOLDER,
};
pub use interaction::{Interaction, InteractionId, InteractionType, NewInteraction};
pub use user::{EmailAddress, NewTrainingUser, TrainingUser, UserId, UserType};
