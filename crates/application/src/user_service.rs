use std::sync::Arc;

use tracing::info;

use phishwise_core::{AppError, AppResult};
use phishwise_domain::{NewTrainingUser, TrainingUser, UserId};

use crate::{Clock, UserRepository};

/// Application service for the training audience.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Registers a user. Duplicate emails fail with `Conflict`.
    pub async fn register_user(&self, input: NewTrainingUser) -> AppResult<TrainingUser> {
        let user = TrainingUser::register(input, self.clock.now());
        self.repository.insert_user(&user).await?;

        info!(user_id = %user.id, user_type = user.user_type.as_str(), "registered training user");
        Ok(user)
    }

    /// Lists all users, newest first.
    pub async fn list_users(&self) -> AppResult<Vec<TrainingUser>> {
        self.repository.list_users().await
    }

    /// Returns one user or `NotFound`.
    pub async fn get_user(&self, user_id: UserId) -> AppResult<TrainingUser> {
        self.repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }
}
