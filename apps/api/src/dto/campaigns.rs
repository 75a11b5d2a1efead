use phishwise_application::{CampaignDispatch, CampaignRecipient};
use phishwise_domain::Campaign;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for campaign creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-campaign-request.ts"
)]
pub struct CreateCampaignRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phishing_type: Option<String>,
    #[serde(default)]
    pub difficulty_level: Option<String>,
    #[serde(default)]
    pub email_subject: Option<String>,
    #[serde(default)]
    pub email_content: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
}

/// API representation of a campaign.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/campaign-response.ts"
)]
pub struct CampaignResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub phishing_type: String,
    pub difficulty_level: String,
    pub email_subject: Option<String>,
    pub email_content: Option<String>,
    pub target_audience: String,
    pub status: String,
    pub created_date: String,
    pub sent_date: Option<String>,
    pub is_active: bool,
}

impl From<Campaign> for CampaignResponse {
    fn from(campaign: Campaign) -> Self {
        Self {
            id: campaign.id.to_string(),
            phishing_type: campaign.phishing_type.as_str().to_owned(),
            difficulty_level: campaign.difficulty.as_str().to_owned(),
            status: campaign.status.as_str().to_owned(),
            created_date: campaign.created_at.to_rfc3339(),
            sent_date: campaign.sent_at.map(|sent_at| sent_at.to_rfc3339()),
            name: campaign.name,
            description: campaign.description,
            email_subject: campaign.email_subject,
            email_content: campaign.email_content,
            target_audience: campaign.target_audience,
            is_active: campaign.is_active,
        }
    }
}

/// One prepared campaign message.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/campaign-recipient-response.ts"
)]
pub struct CampaignRecipientResponse {
    pub user_id: String,
    pub email: String,
    pub tracking_url: String,
}

impl From<CampaignRecipient> for CampaignRecipientResponse {
    fn from(recipient: CampaignRecipient) -> Self {
        Self {
            user_id: recipient.user_id.to_string(),
            email: recipient.email,
            tracking_url: recipient.tracking_url,
        }
    }
}

/// Result of sending a campaign.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/campaign-dispatch-response.ts"
)]
pub struct CampaignDispatchResponse {
    pub message: String,
    pub campaign: CampaignResponse,
    pub recipients: Vec<CampaignRecipientResponse>,
}

impl From<CampaignDispatch> for CampaignDispatchResponse {
    fn from(dispatch: CampaignDispatch) -> Self {
        Self {
            message: format!(
                "campaign prepared for {} recipients",
                dispatch.recipients.len()
            ),
            campaign: CampaignResponse::from(dispatch.campaign),
            recipients: dispatch
                .recipients
                .into_iter()
                .map(CampaignRecipientResponse::from)
                .collect(),
        }
    }
}
