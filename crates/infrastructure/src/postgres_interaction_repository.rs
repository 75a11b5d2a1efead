//! PostgreSQL-backed interaction log.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use phishwise_application::{
    InteractionCounts, InteractionFilter, InteractionListing, InteractionRepository,
};
use phishwise_core::{AppError, AppResult};
use phishwise_domain::{CampaignId, Interaction, InteractionId, InteractionType, UserId};

/// PostgreSQL implementation of the interaction repository port.
#[derive(Clone)]
pub struct PostgresInteractionRepository {
    pool: PgPool,
}

impl PostgresInteractionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InteractionListingRow {
    id: uuid::Uuid,
    user_id: Option<uuid::Uuid>,
    campaign_id: Option<uuid::Uuid>,
    interaction_type: String,
    occurred_at: DateTime<Utc>,
    response_time_seconds: Option<f64>,
    data_entered: Option<String>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    risk_score: i32,
    user_name: Option<String>,
    user_email: Option<String>,
    campaign_name: Option<String>,
}

impl TryFrom<InteractionListingRow> for InteractionListing {
    type Error = AppError;

    fn try_from(row: InteractionListingRow) -> Result<Self, Self::Error> {
        let interaction_type =
            InteractionType::from_str(row.interaction_type.as_str()).map_err(|error| {
                AppError::Internal(format!("stored interaction '{}' is invalid: {error}", row.id))
            })?;

        Ok(Self {
            interaction: Interaction {
                id: InteractionId::from_uuid(row.id),
                user_id: row.user_id.map(UserId::from_uuid),
                campaign_id: row.campaign_id.map(CampaignId::from_uuid),
                interaction_type,
                occurred_at: row.occurred_at,
                response_time_seconds: row.response_time_seconds,
                data_entered: row.data_entered,
                ip_address: row.ip_address,
                user_agent: row.user_agent,
                risk_score: row.risk_score,
            },
            user_name: row.user_name,
            user_email: row.user_email,
            campaign_name: row.campaign_name,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InteractionCountsRow {
    total: i64,
    clicks: i64,
}

#[async_trait]
impl InteractionRepository for PostgresInteractionRepository {
    async fn insert_interaction(&self, interaction: &Interaction) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_interactions (
                id,
                user_id,
                campaign_id,
                interaction_type,
                occurred_at,
                response_time_seconds,
                data_entered,
                ip_address,
                user_agent,
                risk_score
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(interaction.id.as_uuid())
        .bind(interaction.user_id.map(|user_id| user_id.as_uuid()))
        .bind(interaction.campaign_id.map(|campaign_id| campaign_id.as_uuid()))
        .bind(interaction.interaction_type.as_str())
        .bind(interaction.occurred_at)
        .bind(interaction.response_time_seconds)
        .bind(interaction.data_entered.as_deref())
        .bind(interaction.ip_address.as_deref())
        .bind(interaction.user_agent.as_deref())
        .bind(interaction.risk_score)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert interaction: {error}")))?;

        Ok(())
    }

    async fn list_interactions(
        &self,
        filter: InteractionFilter,
        limit: Option<usize>,
        offset: usize,
    ) -> AppResult<Vec<InteractionListing>> {
        let limit = limit
            .map(i64::try_from)
            .transpose()
            .map_err(|_| AppError::Validation("page limit is out of range".to_owned()))?;
        let offset = i64::try_from(offset)
            .map_err(|_| AppError::Validation("page offset is out of range".to_owned()))?;

        let rows = sqlx::query_as::<_, InteractionListingRow>(
            r#"
            SELECT
                interactions.id,
                interactions.user_id,
                interactions.campaign_id,
                interactions.interaction_type,
                interactions.occurred_at,
                interactions.response_time_seconds,
                interactions.data_entered,
                interactions.ip_address,
                interactions.user_agent,
                interactions.risk_score,
                users.name AS user_name,
                users.email AS user_email,
                campaigns.name AS campaign_name
            FROM user_interactions interactions
            LEFT JOIN training_users users ON users.id = interactions.user_id
            LEFT JOIN campaigns ON campaigns.id = interactions.campaign_id
            WHERE ($1::UUID IS NULL OR interactions.campaign_id = $1)
              AND ($2::TEXT IS NULL OR interactions.interaction_type = $2)
              AND ($3::TIMESTAMPTZ IS NULL OR interactions.occurred_at >= $3)
              AND ($4::TIMESTAMPTZ IS NULL OR interactions.occurred_at < $4)
            ORDER BY interactions.occurred_at DESC, interactions.id
            LIMIT $5
            OFFSET $6
            "#,
        )
        .bind(filter.campaign_id.map(|campaign_id| campaign_id.as_uuid()))
        .bind(
            filter
                .interaction_type
                .map(|interaction_type| interaction_type.as_str()),
        )
        .bind(filter.occurred_from())
        .bind(filter.occurred_before())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list interactions: {error}")))?;

        rows.into_iter().map(InteractionListing::try_from).collect()
    }

    async fn count_interactions(&self) -> AppResult<InteractionCounts> {
        let row = sqlx::query_as::<_, InteractionCountsRow>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE interaction_type = 'click') AS clicks
            FROM user_interactions
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count interactions: {error}")))?;

        Ok(InteractionCounts {
            total: u64::try_from(row.total).unwrap_or_default(),
            clicks: u64::try_from(row.clicks).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests;
