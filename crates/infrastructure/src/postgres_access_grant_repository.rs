//! PostgreSQL-backed access grant ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use phishwise_application::{
    AccessGrantListing, AccessGrantRepository, RecordUseOutcome, UsePolicy,
};
use phishwise_core::{AppError, AppResult};
use phishwise_domain::{AccessCode, AccessGrant, CampaignId, GrantRejection, UserId};

/// PostgreSQL implementation of the access grant repository port.
#[derive(Clone)]
pub struct PostgresAccessGrantRepository {
    pool: PgPool,
}

impl PostgresAccessGrantRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccessGrantRow {
    code: String,
    user_id: Option<uuid::Uuid>,
    campaign_id: Option<uuid::Uuid>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    is_active: bool,
    used_count: i32,
    max_uses: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct AccessGrantListingRow {
    #[sqlx(flatten)]
    grant: AccessGrantRow,
    campaign_name: Option<String>,
}

impl TryFrom<AccessGrantRow> for AccessGrant {
    type Error = AppError;

    fn try_from(row: AccessGrantRow) -> Result<Self, Self::Error> {
        let code = AccessCode::parse(row.code.as_str()).map_err(|error| {
            AppError::Internal(format!("stored access code '{}' is invalid: {error}", row.code))
        })?;

        Ok(AccessGrant::restore(
            code,
            row.user_id.map(UserId::from_uuid),
            row.campaign_id.map(CampaignId::from_uuid),
            row.created_at,
            row.expires_at,
            row.is_active,
            counter_from_column(row.used_count, "used_count")?,
            counter_from_column(row.max_uses, "max_uses")?,
        ))
    }
}

fn counter_from_column(value: i32, column: &str) -> AppResult<u32> {
    u32::try_from(value)
        .map_err(|_| AppError::Internal(format!("stored {column} '{value}' is negative")))
}

fn counter_to_column(value: u32, column: &str) -> AppResult<i32> {
    i32::try_from(value)
        .map_err(|_| AppError::Validation(format!("{column} '{value}' is out of range")))
}

#[async_trait]
impl AccessGrantRepository for PostgresAccessGrantRepository {
    async fn insert_grant(&self, grant: &AccessGrant) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO access_grants (
                code,
                user_id,
                campaign_id,
                created_at,
                expires_at,
                is_active,
                used_count,
                max_uses
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(grant.code().as_str())
        .bind(grant.subject_user().map(|user_id| user_id.as_uuid()))
        .bind(grant.subject_campaign().map(|campaign_id| campaign_id.as_uuid()))
        .bind(grant.created_at())
        .bind(grant.expires_at())
        .bind(grant.is_active())
        .bind(counter_to_column(grant.used_count(), "used_count")?)
        .bind(counter_to_column(grant.max_uses(), "max_uses")?)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "access code '{}' is already issued",
                    grant.code()
                ));
            }

            AppError::Internal(format!("failed to insert access grant: {error}"))
        })?;

        Ok(())
    }

    async fn find_grant(&self, code: &AccessCode) -> AppResult<Option<AccessGrant>> {
        let row = sqlx::query_as::<_, AccessGrantRow>(
            r#"
            SELECT code, user_id, campaign_id, created_at, expires_at, is_active,
                used_count, max_uses
            FROM access_grants
            WHERE code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find access grant: {error}")))?;

        row.map(AccessGrant::try_from).transpose()
    }

    async fn record_use(
        &self,
        code: &AccessCode,
        policy: UsePolicy,
        now: DateTime<Utc>,
    ) -> AppResult<RecordUseOutcome> {
        let used_count = match policy {
            UsePolicy::Strict => {
                sqlx::query_scalar::<_, i32>(
                    r#"
                    UPDATE access_grants
                    SET used_count = used_count + 1
                    WHERE code = $1
                        AND is_active
                        AND expires_at >= $2
                        AND used_count < max_uses
                    RETURNING used_count
                    "#,
                )
                .bind(code.as_str())
                .bind(now)
                .fetch_optional(&self.pool)
                .await
            }
            UsePolicy::BestEffort => {
                sqlx::query_scalar::<_, i32>(
                    r#"
                    UPDATE access_grants
                    SET used_count = used_count + 1
                    WHERE code = $1
                    RETURNING used_count
                    "#,
                )
                .bind(code.as_str())
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(|error| AppError::Internal(format!("failed to record access use: {error}")))?;

        if let Some(used_count) = used_count {
            return Ok(RecordUseOutcome::Recorded {
                used_count: counter_from_column(used_count, "used_count")?,
            });
        }

        let Some(grant) = self.find_grant(code).await? else {
            return Ok(RecordUseOutcome::NotFound);
        };

        let rejection = grant
            .evaluate(now)
            .err()
            .unwrap_or(GrantRejection::UsageLimitReached);
        debug!(
            %code,
            policy = policy.as_str(),
            reason = rejection.reason(),
            "access grant use refused"
        );
        Ok(RecordUseOutcome::Refused(rejection))
    }

    async fn revoke_grant(&self, code: &AccessCode) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE access_grants
            SET is_active = FALSE
            WHERE code = $1
            "#,
        )
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke access grant: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_grants(&self) -> AppResult<Vec<AccessGrantListing>> {
        let rows = sqlx::query_as::<_, AccessGrantListingRow>(
            r#"
            SELECT
                grants.code,
                grants.user_id,
                grants.campaign_id,
                grants.created_at,
                grants.expires_at,
                grants.is_active,
                grants.used_count,
                grants.max_uses,
                campaigns.name AS campaign_name
            FROM access_grants grants
            LEFT JOIN campaigns ON campaigns.id = grants.campaign_id
            ORDER BY grants.created_at DESC, grants.code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list access grants: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(AccessGrantListing {
                    grant: AccessGrant::try_from(row.grant)?,
                    campaign_name: row.campaign_name,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
