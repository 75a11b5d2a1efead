//! PostgreSQL-backed campaign repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use phishwise_application::CampaignRepository;
use phishwise_core::{AppError, AppResult};
use phishwise_domain::{Campaign, CampaignId, CampaignStatus, DifficultyLevel, PhishingType};

/// PostgreSQL implementation of the campaign repository port.
#[derive(Clone)]
pub struct PostgresCampaignRepository {
    pool: PgPool,
}

impl PostgresCampaignRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CampaignRow {
    id: uuid::Uuid,
    name: String,
    description: Option<String>,
    phishing_type: String,
    difficulty_level: String,
    email_subject: Option<String>,
    email_content: Option<String>,
    target_audience: String,
    status: String,
    created_at: DateTime<Utc>,
    sent_at: Option<DateTime<Utc>>,
    is_active: bool,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = AppError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        let campaign_id = row.id;
        let invalid = move |error: AppError| {
            AppError::Internal(format!("stored campaign '{campaign_id}' is invalid: {error}"))
        };

        Ok(Self {
            id: CampaignId::from_uuid(row.id),
            phishing_type: PhishingType::from_str(row.phishing_type.as_str()).map_err(invalid)?,
            difficulty: DifficultyLevel::from_str(row.difficulty_level.as_str())
                .map_err(invalid)?,
            status: CampaignStatus::from_str(row.status.as_str()).map_err(invalid)?,
            name: row.name,
            description: row.description,
            email_subject: row.email_subject,
            email_content: row.email_content,
            target_audience: row.target_audience,
            created_at: row.created_at,
            sent_at: row.sent_at,
            is_active: row.is_active,
        })
    }
}

#[async_trait]
impl CampaignRepository for PostgresCampaignRepository {
    async fn insert_campaign(&self, campaign: &Campaign) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id,
                name,
                description,
                phishing_type,
                difficulty_level,
                email_subject,
                email_content,
                target_audience,
                status,
                created_at,
                sent_at,
                is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(campaign.id.as_uuid())
        .bind(campaign.name.as_str())
        .bind(campaign.description.as_deref())
        .bind(campaign.phishing_type.as_str())
        .bind(campaign.difficulty.as_str())
        .bind(campaign.email_subject.as_deref())
        .bind(campaign.email_content.as_deref())
        .bind(campaign.target_audience.as_str())
        .bind(campaign.status.as_str())
        .bind(campaign.created_at)
        .bind(campaign.sent_at)
        .bind(campaign.is_active)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert campaign: {error}")))?;

        Ok(())
    }

    async fn list_campaigns(&self) -> AppResult<Vec<Campaign>> {
        let rows = sqlx::query_as::<_, CampaignRow>(
            r#"
            SELECT
                id,
                name,
                description,
                phishing_type,
                difficulty_level,
                email_subject,
                email_content,
                target_audience,
                status,
                created_at,
                sent_at,
                is_active
            FROM campaigns
            WHERE is_active
            ORDER BY created_at DESC, name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list campaigns: {error}")))?;

        rows.into_iter().map(Campaign::try_from).collect()
    }

    async fn find_campaign(&self, campaign_id: CampaignId) -> AppResult<Option<Campaign>> {
        let row = sqlx::query_as::<_, CampaignRow>(
            r#"
            SELECT
                id,
                name,
                description,
                phishing_type,
                difficulty_level,
                email_subject,
                email_content,
                target_audience,
                status,
                created_at,
                sent_at,
                is_active
            FROM campaigns
            WHERE id = $1
            "#,
        )
        .bind(campaign_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find campaign: {error}")))?;

        row.map(Campaign::try_from).transpose()
    }

    async fn mark_sent(&self, campaign_id: CampaignId, sent_at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET status = $2, sent_at = $3
            WHERE id = $1
            "#,
        )
        .bind(campaign_id.as_uuid())
        .bind(CampaignStatus::Sent.as_str())
        .bind(sent_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to mark campaign sent: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_active_campaigns(&self) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM campaigns WHERE is_active
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count campaigns: {error}")))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests;
