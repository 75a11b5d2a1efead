use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use phishwise_application::{
    AccessGrantListing, AccessGrantRepository, CampaignRepository, InteractionCounts,
    InteractionFilter, InteractionListing, InteractionRepository, RecordUseOutcome, UsePolicy,
    UserRepository,
};
use phishwise_core::{AppError, AppResult};
use phishwise_domain::{
    AccessCode, AccessGrant, Campaign, CampaignId, CampaignStatus, GrantRejection, Interaction,
    InteractionType, TrainingUser, UserId,
};

#[derive(Debug, Default)]
struct TrainingState {
    users: Vec<TrainingUser>,
    campaigns: Vec<Campaign>,
    interactions: Vec<Interaction>,
    grants: HashMap<String, AccessGrant>,
}

impl TrainingState {
    fn campaign_name(&self, campaign_id: Option<CampaignId>) -> Option<String> {
        let campaign_id = campaign_id?;
        self.campaigns
            .iter()
            .find(|campaign| campaign.id == campaign_id)
            .map(|campaign| campaign.name.clone())
    }

    fn user(&self, user_id: Option<UserId>) -> Option<&TrainingUser> {
        let user_id = user_id?;
        self.users.iter().find(|user| user.id == user_id)
    }
}

/// In-memory implementation of every training repository port.
///
/// One shared state backs all ports so listings can resolve user and
/// campaign labels the way SQL joins do.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTrainingRepository {
    state: Arc<RwLock<TrainingState>>,
}

impl InMemoryTrainingRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryTrainingRepository {
    async fn insert_user(&self, user: &TrainingUser) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|stored| stored.email == user.email) {
            return Err(AppError::Conflict(
                "a user with this email already exists".to_owned(),
            ));
        }

        state.users.push(user.clone());
        Ok(())
    }

    async fn list_users(&self) -> AppResult<Vec<TrainingUser>> {
        let mut users = self.state.read().await.users.clone();
        users.sort_by(|left, right| right.registered_at.cmp(&left.registered_at));
        Ok(users)
    }

    async fn list_active_users(&self) -> AppResult<Vec<TrainingUser>> {
        let mut users: Vec<TrainingUser> = self
            .state
            .read()
            .await
            .users
            .iter()
            .filter(|user| user.is_active)
            .cloned()
            .collect();
        users.sort_by_key(|user| user.registered_at);
        Ok(users)
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<TrainingUser>> {
        Ok(self.state.read().await.user(Some(user_id)).cloned())
    }

    async fn count_active_users(&self) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state.users.iter().filter(|user| user.is_active).count() as u64)
    }
}

#[async_trait]
impl CampaignRepository for InMemoryTrainingRepository {
    async fn insert_campaign(&self, campaign: &Campaign) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.campaigns.iter().any(|stored| stored.id == campaign.id) {
            return Err(AppError::Conflict(format!(
                "campaign '{}' already exists",
                campaign.id
            )));
        }

        state.campaigns.push(campaign.clone());
        Ok(())
    }

    async fn list_campaigns(&self) -> AppResult<Vec<Campaign>> {
        let mut campaigns: Vec<Campaign> = self
            .state
            .read()
            .await
            .campaigns
            .iter()
            .filter(|campaign| campaign.is_active)
            .cloned()
            .collect();
        campaigns.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(campaigns)
    }

    async fn find_campaign(&self, campaign_id: CampaignId) -> AppResult<Option<Campaign>> {
        Ok(self
            .state
            .read()
            .await
            .campaigns
            .iter()
            .find(|campaign| campaign.id == campaign_id)
            .cloned())
    }

    async fn mark_sent(&self, campaign_id: CampaignId, sent_at: DateTime<Utc>) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(campaign) = state
            .campaigns
            .iter_mut()
            .find(|campaign| campaign.id == campaign_id)
        else {
            return Ok(false);
        };

        campaign.status = CampaignStatus::Sent;
        campaign.sent_at = Some(sent_at);
        Ok(true)
    }

    async fn count_active_campaigns(&self) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .campaigns
            .iter()
            .filter(|campaign| campaign.is_active)
            .count() as u64)
    }
}

#[async_trait]
impl InteractionRepository for InMemoryTrainingRepository {
    async fn insert_interaction(&self, interaction: &Interaction) -> AppResult<()> {
        self.state
            .write()
            .await
            .interactions
            .push(interaction.clone());
        Ok(())
    }

    async fn list_interactions(
        &self,
        filter: InteractionFilter,
        limit: Option<usize>,
        offset: usize,
    ) -> AppResult<Vec<InteractionListing>> {
        let state = self.state.read().await;

        let mut matching: Vec<&Interaction> = state
            .interactions
            .iter()
            .filter(|interaction| filter.matches(interaction))
            .collect();
        // Stable sort keeps later inserts first among equal timestamps.
        matching.reverse();
        matching.sort_by(|left, right| right.occurred_at.cmp(&left.occurred_at));

        Ok(matching
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .map(|interaction| {
                let user = state.user(interaction.user_id);
                InteractionListing {
                    interaction: interaction.clone(),
                    user_name: user.and_then(|user| user.name.clone()),
                    user_email: user.map(|user| user.email.as_str().to_owned()),
                    campaign_name: state.campaign_name(interaction.campaign_id),
                }
            })
            .collect())
    }

    async fn count_interactions(&self) -> AppResult<InteractionCounts> {
        let state = self.state.read().await;
        Ok(InteractionCounts {
            total: state.interactions.len() as u64,
            clicks: state
                .interactions
                .iter()
                .filter(|interaction| interaction.interaction_type == InteractionType::Click)
                .count() as u64,
        })
    }
}

#[async_trait]
impl AccessGrantRepository for InMemoryTrainingRepository {
    async fn insert_grant(&self, grant: &AccessGrant) -> AppResult<()> {
        let mut state = self.state.write().await;
        let key = grant.code().as_str().to_owned();
        if state.grants.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "access code '{}' is already issued",
                grant.code()
            )));
        }

        state.grants.insert(key, grant.clone());
        Ok(())
    }

    async fn find_grant(&self, code: &AccessCode) -> AppResult<Option<AccessGrant>> {
        Ok(self.state.read().await.grants.get(code.as_str()).cloned())
    }

    async fn record_use(
        &self,
        code: &AccessCode,
        policy: UsePolicy,
        now: DateTime<Utc>,
    ) -> AppResult<RecordUseOutcome> {
        let mut state = self.state.write().await;
        let Some(grant) = state.grants.get_mut(code.as_str()) else {
            return Ok(RecordUseOutcome::NotFound);
        };

        match policy {
            UsePolicy::Strict => {
                if let Err(rejection) = grant.evaluate(now) {
                    return Ok(RecordUseOutcome::Refused(rejection));
                }
                if !grant.try_record_use() {
                    return Ok(RecordUseOutcome::Refused(GrantRejection::UsageLimitReached));
                }
            }
            UsePolicy::BestEffort => grant.force_record_use(),
        }

        Ok(RecordUseOutcome::Recorded {
            used_count: grant.used_count(),
        })
    }

    async fn revoke_grant(&self, code: &AccessCode) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(grant) = state.grants.get_mut(code.as_str()) else {
            return Ok(false);
        };

        grant.revoke();
        Ok(true)
    }

    async fn list_grants(&self) -> AppResult<Vec<AccessGrantListing>> {
        let state = self.state.read().await;
        let mut listings: Vec<AccessGrantListing> = state
            .grants
            .values()
            .map(|grant| AccessGrantListing {
                grant: grant.clone(),
                campaign_name: state.campaign_name(grant.subject_campaign()),
            })
            .collect();
        listings.sort_by(|left, right| {
            right
                .grant
                .created_at()
                .cmp(&left.grant.created_at())
                .then_with(|| left.grant.code().as_str().cmp(right.grant.code().as_str()))
        });

        Ok(listings)
    }
}
