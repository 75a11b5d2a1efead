use phishwise_application::{InteractionListing, TrainingStats};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Joined interaction row for the visitor table.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/interaction-response.ts"
)]
pub struct InteractionResponse {
    pub id: String,
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub interaction_type: String,
    pub response_time: Option<f64>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub risk_score: i32,
    pub interaction_date: String,
}

impl From<InteractionListing> for InteractionResponse {
    fn from(listing: InteractionListing) -> Self {
        let interaction = listing.interaction;
        Self {
            id: interaction.id.to_string(),
            user_id: interaction.user_id.map(|user_id| user_id.to_string()),
            name: listing.user_name,
            email: listing.user_email,
            campaign_id: interaction
                .campaign_id
                .map(|campaign_id| campaign_id.to_string()),
            campaign_name: listing.campaign_name,
            interaction_type: interaction.interaction_type.as_str().to_owned(),
            response_time: interaction.response_time_seconds,
            ip_address: interaction.ip_address,
            user_agent: interaction.user_agent,
            risk_score: interaction.risk_score,
            interaction_date: interaction.occurred_at.to_rfc3339(),
        }
    }
}

/// Dashboard counters.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/stats-response.ts"
)]
pub struct StatsResponse {
    #[ts(type = "number")]
    pub total_users: u64,
    #[ts(type = "number")]
    pub total_campaigns: u64,
    #[ts(type = "number")]
    pub total_responses: u64,
    pub success_rate: f64,
}

impl From<TrainingStats> for StatsResponse {
    fn from(stats: TrainingStats) -> Self {
        Self {
            total_users: stats.total_users,
            total_campaigns: stats.total_campaigns,
            total_responses: stats.total_responses,
            success_rate: stats.success_rate,
        }
    }
}

/// Incoming payload when a recipient reports a lure.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/report-phishing-request.ts"
)]
pub struct ReportPhishingRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub response_time: Option<f64>,
}
