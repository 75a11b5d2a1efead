use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};

use phishwise_core::AppResult;
use phishwise_domain::{Campaign, CampaignId, Interaction, InteractionType, TrainingUser, UserId};

/// Repository port for the training audience.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user. Returns `Conflict` when the email is taken.
    async fn insert_user(&self, user: &TrainingUser) -> AppResult<()>;

    /// Lists all users, newest first.
    async fn list_users(&self) -> AppResult<Vec<TrainingUser>>;

    /// Lists active users, oldest first.
    async fn list_active_users(&self) -> AppResult<Vec<TrainingUser>>;

    /// Finds one user.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<TrainingUser>>;

    /// Counts active users.
    async fn count_active_users(&self) -> AppResult<u64>;
}

/// Repository port for simulated campaigns.
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Persists a new campaign.
    async fn insert_campaign(&self, campaign: &Campaign) -> AppResult<()>;

    /// Lists active campaigns, newest first.
    async fn list_campaigns(&self) -> AppResult<Vec<Campaign>>;

    /// Finds one campaign.
    async fn find_campaign(&self, campaign_id: CampaignId) -> AppResult<Option<Campaign>>;

    /// Marks a campaign as sent. Returns whether a campaign matched.
    async fn mark_sent(&self, campaign_id: CampaignId, sent_at: DateTime<Utc>) -> AppResult<bool>;

    /// Counts active campaigns.
    async fn count_active_campaigns(&self) -> AppResult<u64>;
}

/// Filters applied to interaction listings and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionFilter {
    /// Only interactions of this campaign.
    pub campaign_id: Option<CampaignId>,
    /// Only interactions of this type.
    pub interaction_type: Option<InteractionType>,
    /// First day included (UTC).
    pub date_from: Option<NaiveDate>,
    /// Last day included (UTC).
    pub date_to: Option<NaiveDate>,
}

impl InteractionFilter {
    /// Inclusive lower bound instant.
    #[must_use]
    pub fn occurred_from(&self) -> Option<DateTime<Utc>> {
        self.date_from
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|value| value.and_utc())
    }

    /// Exclusive upper bound instant: midnight after `date_to`.
    #[must_use]
    pub fn occurred_before(&self) -> Option<DateTime<Utc>> {
        self.date_to
            .and_then(|date| date.checked_add_days(Days::new(1)))
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|value| value.and_utc())
    }

    /// Whether an interaction passes this filter.
    #[must_use]
    pub fn matches(&self, interaction: &Interaction) -> bool {
        self.campaign_id
            .is_none_or(|campaign_id| interaction.campaign_id == Some(campaign_id))
            && self
                .interaction_type
                .is_none_or(|interaction_type| interaction.interaction_type == interaction_type)
            && self
                .occurred_from()
                .is_none_or(|from| interaction.occurred_at >= from)
            && self
                .occurred_before()
                .is_none_or(|before| interaction.occurred_at < before)
    }
}

/// Interaction joined with user and campaign labels.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionListing {
    /// Stored interaction.
    pub interaction: Interaction,
    /// Name of the acting user.
    pub user_name: Option<String>,
    /// Email of the acting user.
    pub user_email: Option<String>,
    /// Name of the campaign.
    pub campaign_name: Option<String>,
}

/// Aggregate interaction counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionCounts {
    /// All recorded interactions.
    pub total: u64,
    /// Interactions of type `click`.
    pub clicks: u64,
}

/// Repository port for tracked interactions.
#[async_trait]
pub trait InteractionRepository: Send + Sync {
    /// Persists one interaction.
    async fn insert_interaction(&self, interaction: &Interaction) -> AppResult<()>;

    /// Lists matching interactions, newest first. `limit = None` returns all.
    async fn list_interactions(
        &self,
        filter: InteractionFilter,
        limit: Option<usize>,
        offset: usize,
    ) -> AppResult<Vec<InteractionListing>>;

    /// Returns aggregate counters over all interactions.
    async fn count_interactions(&self) -> AppResult<InteractionCounts>;
}
