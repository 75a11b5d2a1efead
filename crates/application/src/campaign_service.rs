use std::sync::Arc;

use tracing::info;

use phishwise_core::{AppError, AppResult};
use phishwise_domain::{Campaign, CampaignId, CampaignStatus, NewCampaign, UserId};

use crate::{CampaignRepository, Clock, UserRepository};

/// One recipient of a campaign dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignRecipient {
    /// Recipient user.
    pub user_id: UserId,
    /// Recipient address.
    pub email: String,
    /// Personal tracking link.
    pub tracking_url: String,
    /// Rendered lure body.
    pub body: String,
}

/// Result of sending a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignDispatch {
    /// Campaign after being marked as sent.
    pub campaign: Campaign,
    /// Rendered messages, one per active user.
    pub recipients: Vec<CampaignRecipient>,
}

/// Builds the tracking link of a recipient.
#[must_use]
pub fn tracking_url(base_url: &str, campaign_id: CampaignId, user_id: UserId) -> String {
    format!(
        "{}/track/{campaign_id}?user={user_id}",
        base_url.trim_end_matches('/')
    )
}

/// Application service for simulated campaigns.
#[derive(Clone)]
pub struct CampaignService {
    repository: Arc<dyn CampaignRepository>,
    user_repository: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl CampaignService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn CampaignRepository>,
        user_repository: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            user_repository,
            clock,
        }
    }

    /// Creates a draft campaign.
    pub async fn create_campaign(&self, input: NewCampaign) -> AppResult<Campaign> {
        let campaign = Campaign::create(input, self.clock.now());
        self.repository.insert_campaign(&campaign).await?;

        info!(campaign_id = %campaign.id, name = %campaign.name, "created campaign");
        Ok(campaign)
    }

    /// Lists active campaigns, newest first.
    pub async fn list_campaigns(&self) -> AppResult<Vec<Campaign>> {
        self.repository.list_campaigns().await
    }

    /// Returns one campaign or `NotFound`.
    pub async fn get_campaign(&self, campaign_id: CampaignId) -> AppResult<Campaign> {
        self.repository
            .find_campaign(campaign_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("campaign '{campaign_id}' does not exist")))
    }

    /// Marks a campaign as sent and renders one tracking message per active user.
    ///
    /// Messages are returned to the caller; nothing is delivered.
    pub async fn send_campaign(
        &self,
        campaign_id: CampaignId,
        base_url: &str,
    ) -> AppResult<CampaignDispatch> {
        let mut campaign = self.get_campaign(campaign_id).await?;
        let sent_at = self.clock.now();

        if !self.repository.mark_sent(campaign_id, sent_at).await? {
            return Err(AppError::NotFound(format!(
                "campaign '{campaign_id}' does not exist"
            )));
        }
        campaign.status = CampaignStatus::Sent;
        campaign.sent_at = Some(sent_at);

        let recipients: Vec<CampaignRecipient> = self
            .user_repository
            .list_active_users()
            .await?
            .into_iter()
            .map(|user| {
                let tracking_url = tracking_url(base_url, campaign_id, user.id);
                CampaignRecipient {
                    body: campaign.render_body(&tracking_url),
                    user_id: user.id,
                    email: user.email.into(),
                    tracking_url,
                }
            })
            .collect();

        info!(
            %campaign_id,
            recipients = recipients.len(),
            "campaign dispatch prepared"
        );

        Ok(CampaignDispatch {
            campaign,
            recipients,
        })
    }
}
