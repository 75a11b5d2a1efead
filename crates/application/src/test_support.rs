//! Fakes shared by service tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use phishwise_core::{AppError, AppResult};
use phishwise_domain::{
    AccessCode, AccessGrant, Campaign, CampaignId, CampaignStatus, GrantRejection, Interaction,
    InteractionType, TrainingUser, UserId,
};

use crate::{
    AccessCodeGenerator, AccessGrantListing, AccessGrantRepository, CampaignRepository, Clock,
    InteractionCounts, InteractionFilter, InteractionListing, InteractionRepository,
    RecordUseOutcome, UsePolicy, UserRepository,
};

pub(crate) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
    }
}

/// Yields the queued codes in order, then fails.
pub(crate) struct ScriptedCodeGenerator {
    codes: Mutex<Vec<AccessCode>>,
}

impl ScriptedCodeGenerator {
    pub(crate) fn new(codes: &[&str]) -> Self {
        let mut codes: Vec<AccessCode> = codes
            .iter()
            .filter_map(|code| AccessCode::parse(code).ok())
            .collect();
        codes.reverse();
        Self {
            codes: Mutex::new(codes),
        }
    }
}

impl AccessCodeGenerator for ScriptedCodeGenerator {
    fn generate(&self) -> AppResult<AccessCode> {
        self.codes
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock generator: {error}")))?
            .pop()
            .ok_or_else(|| AppError::Internal("no scripted codes left".to_owned()))
    }
}

#[derive(Default)]
pub(crate) struct FakeGrantRepository {
    grants: RwLock<Vec<AccessGrant>>,
}

#[async_trait]
impl AccessGrantRepository for FakeGrantRepository {
    async fn insert_grant(&self, grant: &AccessGrant) -> AppResult<()> {
        let mut grants = self.grants.write().await;
        if grants.iter().any(|stored| stored.code() == grant.code()) {
            return Err(AppError::Conflict(format!(
                "access code '{}' already exists",
                grant.code()
            )));
        }
        grants.push(grant.clone());
        Ok(())
    }

    async fn find_grant(&self, code: &AccessCode) -> AppResult<Option<AccessGrant>> {
        Ok(self
            .grants
            .read()
            .await
            .iter()
            .find(|grant| grant.code() == code)
            .cloned())
    }

    async fn record_use(
        &self,
        code: &AccessCode,
        policy: UsePolicy,
        now: DateTime<Utc>,
    ) -> AppResult<RecordUseOutcome> {
        let mut grants = self.grants.write().await;
        let Some(grant) = grants.iter_mut().find(|grant| grant.code() == code) else {
            return Ok(RecordUseOutcome::NotFound);
        };

        match policy {
            UsePolicy::Strict => match grant.evaluate(now) {
                Err(rejection) => Ok(RecordUseOutcome::Refused(rejection)),
                Ok(_) if !grant.try_record_use() => Ok(RecordUseOutcome::Refused(
                    GrantRejection::UsageLimitReached,
                )),
                Ok(_) => Ok(RecordUseOutcome::Recorded {
                    used_count: grant.used_count(),
                }),
            },
            UsePolicy::BestEffort => {
                grant.force_record_use();
                Ok(RecordUseOutcome::Recorded {
                    used_count: grant.used_count(),
                })
            }
        }
    }

    async fn revoke_grant(&self, code: &AccessCode) -> AppResult<bool> {
        let mut grants = self.grants.write().await;
        let Some(grant) = grants.iter_mut().find(|grant| grant.code() == code) else {
            return Ok(false);
        };
        grant.revoke();
        Ok(true)
    }

    async fn list_grants(&self) -> AppResult<Vec<AccessGrantListing>> {
        let mut grants: Vec<AccessGrantListing> = self
            .grants
            .read()
            .await
            .iter()
            .map(|grant| AccessGrantListing {
                grant: grant.clone(),
                campaign_name: None,
            })
            .collect();
        grants.sort_by_key(|listing| std::cmp::Reverse(listing.grant.created_at()));
        Ok(grants)
    }
}

#[derive(Default)]
pub(crate) struct FakeUserRepository {
    users: RwLock<Vec<TrainingUser>>,
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn insert_user(&self, user: &TrainingUser) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|stored| stored.email == user.email) {
            return Err(AppError::Conflict(format!(
                "user '{}' already exists",
                user.email.as_str()
            )));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn list_users(&self) -> AppResult<Vec<TrainingUser>> {
        let mut users = self.users.read().await.clone();
        users.reverse();
        Ok(users)
    }

    async fn list_active_users(&self) -> AppResult<Vec<TrainingUser>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .filter(|user| user.is_active)
            .cloned()
            .collect())
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<TrainingUser>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn count_active_users(&self) -> AppResult<u64> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .filter(|user| user.is_active)
            .count() as u64)
    }
}

#[derive(Default)]
pub(crate) struct FakeCampaignRepository {
    campaigns: RwLock<Vec<Campaign>>,
}

#[async_trait]
impl CampaignRepository for FakeCampaignRepository {
    async fn insert_campaign(&self, campaign: &Campaign) -> AppResult<()> {
        self.campaigns.write().await.push(campaign.clone());
        Ok(())
    }

    async fn list_campaigns(&self) -> AppResult<Vec<Campaign>> {
        let mut campaigns = self.campaigns.read().await.clone();
        campaigns.reverse();
        Ok(campaigns)
    }

    async fn find_campaign(&self, campaign_id: CampaignId) -> AppResult<Option<Campaign>> {
        Ok(self
            .campaigns
            .read()
            .await
            .iter()
            .find(|campaign| campaign.id == campaign_id)
            .cloned())
    }

    async fn mark_sent(&self, campaign_id: CampaignId, sent_at: DateTime<Utc>) -> AppResult<bool> {
        let mut campaigns = self.campaigns.write().await;
        let Some(campaign) = campaigns
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
        Ok(self.campaigns.read().await.len() as u64)
    }
}

#[derive(Default)]
pub(crate) struct FakeInteractionRepository {
    interactions: RwLock<Vec<Interaction>>,
}

#[async_trait]
impl InteractionRepository for FakeInteractionRepository {
    async fn insert_interaction(&self, interaction: &Interaction) -> AppResult<()> {
        self.interactions.write().await.push(interaction.clone());
        Ok(())
    }

    async fn list_interactions(
        &self,
        filter: InteractionFilter,
        limit: Option<usize>,
        offset: usize,
    ) -> AppResult<Vec<InteractionListing>> {
        Ok(self
            .interactions
            .read()
            .await
            .iter()
            .rev()
            .filter(|interaction| filter.matches(interaction))
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .map(|interaction| InteractionListing {
                interaction: interaction.clone(),
                user_name: None,
                user_email: None,
                campaign_name: None,
            })
            .collect())
    }

    async fn count_interactions(&self) -> AppResult<InteractionCounts> {
        let interactions = self.interactions.read().await;
        Ok(InteractionCounts {
            total: interactions.len() as u64,
            clicks: interactions
                .iter()
                .filter(|interaction| interaction.interaction_type == InteractionType::Click)
                .count() as u64,
        })
    }
}
