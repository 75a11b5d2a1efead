use chrono::{DateTime, Utc};
use phishwise_application::{AccessGrantListing, AccessValidation, IssuedAccessGrant};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

fn default_valid_days() -> i32 {
    30
}

fn default_max_uses() -> u32 {
    1
}

/// Incoming payload for issuing an external access grant.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-access-grant-request.ts"
)]
pub struct CreateAccessGrantRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default = "default_valid_days")]
    pub valid_days: i32,
    #[serde(default = "default_max_uses")]
    pub max_uses: u32,
}

/// Response returned after issuing a grant.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-grant-issued-response.ts"
)]
pub struct AccessGrantIssuedResponse {
    pub access_code: String,
    pub external_url: String,
    pub expiry_date: String,
    pub base_url: String,
}

impl From<IssuedAccessGrant> for AccessGrantIssuedResponse {
    fn from(issued: IssuedAccessGrant) -> Self {
        Self {
            access_code: issued.grant.code().as_str().to_owned(),
            external_url: issued.external_url,
            expiry_date: issued.grant.expires_at().to_rfc3339(),
            base_url: issued.base_url,
        }
    }
}

/// Validation verdict for a presented code.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-validation-response.ts"
)]
pub struct AccessValidationResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub campaign_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub campaign_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub remaining_uses: Option<u32>,
}

impl From<AccessValidation> for AccessValidationResponse {
    fn from(validation: AccessValidation) -> Self {
        match validation {
            AccessValidation::Valid(valid) => Self {
                valid: true,
                reason: None,
                campaign_id: valid
                    .grant
                    .subject_campaign()
                    .map(|campaign_id| campaign_id.to_string()),
                campaign_name: valid.campaign_name,
                remaining_uses: Some(valid.remaining_uses),
            },
            AccessValidation::Invalid(rejection) => Self {
                valid: false,
                reason: Some(rejection.reason().to_owned()),
                campaign_id: None,
                campaign_name: None,
                remaining_uses: None,
            },
        }
    }
}

/// Result of recording one use.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-use-response.ts"
)]
pub struct AccessUseResponse {
    pub message: String,
    pub used_count: u32,
}

/// API representation of an issued grant.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-grant-response.ts"
)]
pub struct AccessGrantResponse {
    pub access_code: String,
    pub user_id: Option<String>,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub created_date: String,
    pub expiry_date: String,
    pub used_count: u32,
    pub max_uses: u32,
    pub is_active: bool,
    pub status: String,
}

impl AccessGrantResponse {
    /// Builds the listing row with the status derived at `now`.
    pub fn from_listing(listing: AccessGrantListing, now: DateTime<Utc>) -> Self {
        let grant = listing.grant;
        Self {
            access_code: grant.code().as_str().to_owned(),
            user_id: grant.subject_user().map(|user_id| user_id.to_string()),
            campaign_id: grant
                .subject_campaign()
                .map(|campaign_id| campaign_id.to_string()),
            campaign_name: listing.campaign_name,
            created_date: grant.created_at().to_rfc3339(),
            expiry_date: grant.expires_at().to_rfc3339(),
            used_count: grant.used_count(),
            max_uses: grant.max_uses(),
            is_active: grant.is_active(),
            status: grant.status(now).as_str().to_owned(),
        }
    }
}
