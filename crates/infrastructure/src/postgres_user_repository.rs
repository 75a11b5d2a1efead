//! PostgreSQL-backed training user repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use phishwise_application::UserRepository;
use phishwise_core::{AppError, AppResult};
use phishwise_domain::{EmailAddress, TrainingUser, UserId, UserType};

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TrainingUserRow {
    id: uuid::Uuid,
    email: String,
    name: Option<String>,
    department: Option<String>,
    user_type: String,
    registered_at: DateTime<Utc>,
    is_active: bool,
}

impl TryFrom<TrainingUserRow> for TrainingUser {
    type Error = AppError;

    fn try_from(row: TrainingUserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            email: EmailAddress::new(row.email).map_err(stored_value_error)?,
            name: row.name,
            department: row.department,
            user_type: UserType::from_str(row.user_type.as_str()).map_err(stored_value_error)?,
            registered_at: row.registered_at,
            is_active: row.is_active,
        })
    }
}

fn stored_value_error(error: AppError) -> AppError {
    AppError::Internal(format!("stored training user is invalid: {error}"))
}

fn email_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict("a user with this email already exists".to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

fn rows_to_users(rows: Vec<TrainingUserRow>) -> AppResult<Vec<TrainingUser>> {
    rows.into_iter().map(TrainingUser::try_from).collect()
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert_user(&self, user: &TrainingUser) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO training_users (
                id,
                email,
                name,
                department,
                user_type,
                registered_at,
                is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.name.as_deref())
        .bind(user.department.as_deref())
        .bind(user.user_type.as_str())
        .bind(user.registered_at)
        .bind(user.is_active)
        .execute(&self.pool)
        .await
        .map_err(|error| email_conflict_or_internal(error, "insert training user"))?;

        Ok(())
    }

    async fn list_users(&self) -> AppResult<Vec<TrainingUser>> {
        let rows = sqlx::query_as::<_, TrainingUserRow>(
            r#"
            SELECT id, email, name, department, user_type, registered_at, is_active
            FROM training_users
            ORDER BY registered_at DESC, email
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list training users: {error}")))?;

        rows_to_users(rows)
    }

    async fn list_active_users(&self) -> AppResult<Vec<TrainingUser>> {
        let rows = sqlx::query_as::<_, TrainingUserRow>(
            r#"
            SELECT id, email, name, department, user_type, registered_at, is_active
            FROM training_users
            WHERE is_active
            ORDER BY registered_at, email
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list active training users: {error}"))
        })?;

        rows_to_users(rows)
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<TrainingUser>> {
        let row = sqlx::query_as::<_, TrainingUserRow>(
            r#"
            SELECT id, email, name, department, user_type, registered_at, is_active
            FROM training_users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find training user: {error}")))?;

        row.map(TrainingUser::try_from).transpose()
    }

    async fn count_active_users(&self) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM training_users WHERE is_active
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count training users: {error}")))?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}
